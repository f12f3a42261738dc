use crate::{
    entities::{option_value, product_option, product_variant, OptionValue, Product, ProductOption,
        ProductVariant},
    errors::ServiceError,
    events::{Event, EventSender},
    services::catalog::matrix::{
        canonical_key, cartesian_product, AxisValue, OptionAxis, PricingRule, SizeSurchargeRule,
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Default values seeded onto a sizing axis that has none yet.
const DEFAULT_SIZE_VALUES: [&str; 3] = ["S", "M", "L"];

fn is_sizing_option(name: &str) -> bool {
    let name = name.trim();
    name.eq_ignore_ascii_case("talla") || name.eq_ignore_ascii_case("size")
}

/// Service owning the variant matrix: bulk generation plus per-variant
/// store operations.
#[derive(Clone)]
pub struct VariantService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    pricing: Arc<dyn PricingRule>,
}

impl VariantService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self::with_pricing_rule(db, event_sender, Arc::new(SizeSurchargeRule::default()))
    }

    /// Swap the placeholder size-surcharge rule for another pricing scheme.
    pub fn with_pricing_rule(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        pricing: Arc<dyn PricingRule>,
    ) -> Self {
        Self {
            db,
            event_sender,
            pricing,
        }
    }

    /// Expand the option matrix and persist the combinations that do not
    /// exist yet.
    ///
    /// The whole call is one transaction: either every missing combination
    /// is inserted or none is. A combination inserted concurrently by
    /// another call is skipped (the unique index arbitrates) and only
    /// lowers the returned count. Running twice with unchanged inputs
    /// creates nothing the second time.
    #[instrument(skip(self))]
    pub async fn generate_variants(
        &self,
        input: GenerateVariantsInput,
    ) -> Result<GenerateVariantsResult, ServiceError> {
        if input.axes.is_empty() {
            return Err(ServiceError::InvalidInput(
                "no values to combine".to_string(),
            ));
        }

        Product::find_by_id(input.product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", input.product_id))
            })?;

        let txn = self.db.begin().await?;

        let mut axes: Vec<OptionAxis> = Vec::with_capacity(input.axes.len());
        for selection in &input.axes {
            let axis = self
                .load_axis(&txn, input.product_id, selection)
                .await?;
            if axis.values.is_empty() {
                // An axis without visible values would annihilate the whole
                // matrix; drop it instead and combine what remains.
                continue;
            }
            axes.push(axis);
        }

        if axes.is_empty() {
            txn.rollback().await?;
            return Err(ServiceError::InvalidInput(
                "no values to combine".to_string(),
            ));
        }

        // Keys of combinations that already exist, recomputed from the
        // stored value sets rather than trusted from the key column.
        let mut existing: HashSet<String> = ProductVariant::find()
            .filter(product_variant::Column::ProductId.eq(input.product_id))
            .all(&txn)
            .await?
            .iter()
            .map(|v| canonical_key(&v.value_ids()))
            .collect();

        let mut created: u64 = 0;
        let mut skipped_conflicts: u64 = 0;
        let now = Utc::now();

        for combination in cartesian_product(&axes) {
            let key = combination.canonical_key();
            if !existing.insert(key.clone()) {
                continue;
            }

            let price = self.pricing.price_for(input.base_price, &combination);
            let variant = product_variant::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(input.product_id),
                price: Set(Some(price)),
                stock: Set(None),
                is_active: Set(true),
                option_value_ids: Set(serde_json::json!(combination.value_ids())),
                combination_key: Set(key.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            };

            // A concurrent generation call may have committed the same
            // combination after our read; that is "already exists", not an
            // error.
            let rows = ProductVariant::insert(variant)
                .on_conflict(
                    OnConflict::columns([
                        product_variant::Column::ProductId,
                        product_variant::Column::CombinationKey,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;

            if rows == 0 {
                warn!(
                    "Combination {} for product {} already inserted concurrently; skipping",
                    key, input.product_id
                );
                skipped_conflicts += 1;
            } else {
                created += 1;
            }
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::VariantsGenerated {
                product_id: input.product_id,
                created,
                skipped_conflicts,
            })
            .await;

        info!(
            "Generated {} variants for product {} ({} conflicts skipped)",
            created, input.product_id, skipped_conflicts
        );
        Ok(GenerateVariantsResult {
            created,
            skipped_conflicts,
        })
    }

    /// Partially update a variant. `price` and `stock` distinguish "leave
    /// unchanged" (absent) from "unset" (explicit null); unset price falls
    /// back to the base price at display time, unset stock means untracked.
    #[instrument(skip(self))]
    pub async fn update_variant(
        &self,
        variant_id: Uuid,
        input: UpdateVariantInput,
    ) -> Result<product_variant::Model, ServiceError> {
        let variant = ProductVariant::find_by_id(variant_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Variant {} not found", variant_id)))?;
        let product_id = variant.product_id;

        if let Some(Some(price)) = &input.price {
            if *price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "price cannot be negative".to_string(),
                ));
            }
        }
        if let Some(Some(stock)) = &input.stock {
            if *stock < 0 {
                return Err(ServiceError::ValidationError(
                    "stock cannot be negative".to_string(),
                ));
            }
        }

        let mut active: product_variant::ActiveModel = variant.into();
        if let Some(price) = input.price {
            active.price = Set(price.map(|p| p.round_dp(2)));
        }
        if let Some(stock) = input.stock {
            active.stock = Set(stock);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let variant = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::VariantUpdated {
                product_id,
                variant_id,
            })
            .await;

        info!("Updated variant {}", variant_id);
        Ok(variant)
    }

    /// Delete a variant. Removes the row only; no regeneration is triggered.
    #[instrument(skip(self))]
    pub async fn delete_variant(&self, variant_id: Uuid) -> Result<(), ServiceError> {
        let variant = ProductVariant::find_by_id(variant_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Variant {} not found", variant_id)))?;

        let product_id = variant.product_id;
        let active: product_variant::ActiveModel = variant.into();
        active.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::VariantDeleted {
                product_id,
                variant_id,
            })
            .await;

        info!("Deleted variant {}", variant_id);
        Ok(())
    }

    /// List a product's variants with each combination resolved back to
    /// human-readable `option: value` pairs, ordered by option position.
    #[instrument(skip(self))]
    pub async fn list_variants(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<VariantView>, ServiceError> {
        let product = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let options = ProductOption::find()
            .filter(product_option::Column::ProductId.eq(product_id))
            .order_by_asc(product_option::Column::Position)
            .all(&*self.db)
            .await?;

        let option_ids: Vec<Uuid> = options.iter().map(|o| o.id).collect();
        let values = if option_ids.is_empty() {
            Vec::new()
        } else {
            OptionValue::find()
                .filter(option_value::Column::OptionId.is_in(option_ids))
                .all(&*self.db)
                .await?
        };

        // value id -> (option position, resolved selection)
        let option_info: HashMap<Uuid, (i32, String)> = options
            .iter()
            .map(|o| (o.id, (o.position, o.name.clone())))
            .collect();
        let value_info: HashMap<Uuid, (i32, VariantSelection)> = values
            .into_iter()
            .filter_map(|v| {
                let (position, option_name) = option_info.get(&v.option_id)?.clone();
                Some((
                    v.id,
                    (
                        position,
                        VariantSelection {
                            option_id: v.option_id,
                            option_name,
                            value_id: v.id,
                            value: v.value,
                        },
                    ),
                ))
            })
            .collect();

        let variants = ProductVariant::find()
            .filter(product_variant::Column::ProductId.eq(product_id))
            .order_by_asc(product_variant::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(variants
            .into_iter()
            .map(|variant| {
                let mut selections: Vec<(i32, VariantSelection)> = variant
                    .value_ids()
                    .into_iter()
                    .filter_map(|id| value_info.get(&id).cloned())
                    .collect();
                selections.sort_by_key(|(position, _)| *position);
                let selections: Vec<VariantSelection> =
                    selections.into_iter().map(|(_, s)| s).collect();

                let display_name = selections
                    .iter()
                    .map(|s| format!("{}: {}", s.option_name, s.value))
                    .collect::<Vec<_>>()
                    .join(" / ");

                VariantView {
                    id: variant.id,
                    product_id: variant.product_id,
                    price: variant.price,
                    effective_price: variant.price.unwrap_or(product.price),
                    stock: variant.stock,
                    is_active: variant.is_active,
                    display_name,
                    selections,
                }
            })
            .collect())
    }

    /// Loads one axis for generation: the option's visible values in display
    /// order, optionally restricted to a requested subset. A sizing axis
    /// with no values at all gets the default sizes seeded before use.
    async fn load_axis(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
        selection: &AxisSelection,
    ) -> Result<OptionAxis, ServiceError> {
        let option = ProductOption::find_by_id(selection.option_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Option {} not found", selection.option_id))
            })?;

        if option.product_id != product_id {
            return Err(ServiceError::ValidationError(format!(
                "Option {} does not belong to product {}",
                selection.option_id, product_id
            )));
        }

        let mut values = OptionValue::find()
            .filter(option_value::Column::OptionId.eq(option.id))
            .filter(option_value::Column::Visible.eq(true))
            .order_by_asc(option_value::Column::Position)
            .all(txn)
            .await?;

        if !selection.value_ids.is_empty() {
            let requested: HashSet<Uuid> = selection.value_ids.iter().copied().collect();
            values.retain(|v| requested.contains(&v.id));
        }

        if values.is_empty() && selection.value_ids.is_empty() && is_sizing_option(&option.name) {
            values = seed_default_size_values(txn, option.id).await?;
        }

        Ok(OptionAxis {
            option_id: option.id,
            values: values
                .into_iter()
                .map(|v| AxisValue {
                    id: v.id,
                    label: v.value,
                })
                .collect(),
        })
    }
}

async fn seed_default_size_values(
    txn: &DatabaseTransaction,
    option_id: Uuid,
) -> Result<Vec<option_value::Model>, ServiceError> {
    let now = Utc::now();
    let mut seeded = Vec::with_capacity(DEFAULT_SIZE_VALUES.len());

    for (position, label) in DEFAULT_SIZE_VALUES.iter().enumerate() {
        let value = option_value::ActiveModel {
            id: Set(Uuid::new_v4()),
            option_id: Set(option_id),
            value: Set(label.to_string()),
            swatch_hex: Set(None),
            position: Set(position as i32),
            visible: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        seeded.push(value.insert(txn).await?);
    }

    info!("Seeded default size values onto option {}", option_id);
    Ok(seeded)
}

/// One option axis of a generation request. An empty `value_ids` means
/// "every visible value of the option".
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AxisSelection {
    pub option_id: Uuid,
    #[serde(default)]
    pub value_ids: Vec<Uuid>,
}

/// Input for variant generation
#[derive(Debug, Deserialize, Serialize)]
pub struct GenerateVariantsInput {
    pub product_id: Uuid,
    pub axes: Vec<AxisSelection>,
    pub base_price: Decimal,
}

/// Outcome of a generation call. `skipped_conflicts` counts combinations a
/// concurrent call inserted first.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerateVariantsResult {
    pub created: u64,
    pub skipped_conflicts: u64,
}

/// Partial update of a variant. Outer `Option` distinguishes absent fields
/// from explicit nulls; the HTTP layer builds this from its own patch
/// encoding.
#[derive(Debug, Default)]
pub struct UpdateVariantInput {
    pub price: Option<Option<Decimal>>,
    pub stock: Option<Option<i32>>,
    pub is_active: Option<bool>,
}

/// One resolved `option: value` pair of a variant's combination
#[derive(Debug, Clone, Serialize)]
pub struct VariantSelection {
    pub option_id: Uuid,
    pub option_name: String,
    pub value_id: Uuid,
    pub value: String,
}

/// Read view of a variant with its combination resolved for rendering
#[derive(Debug, Serialize)]
pub struct VariantView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub price: Option<Decimal>,
    pub effective_price: Decimal,
    pub stock: Option<i32>,
    pub is_active: bool,
    pub display_name: String,
    pub selections: Vec<VariantSelection>,
}
