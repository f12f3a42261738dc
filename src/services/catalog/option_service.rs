use crate::{
    entities::{option_value, product_option, product_variant, OptionValue, Product, ProductOption,
        ProductVariant},
    errors::ServiceError,
    events::{Event, EventSender},
    services::catalog::color::normalize_color,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Service for managing product options and their values.
///
/// Deleting an option or a value cascades to the variants whose combination
/// references it; an orphaned combination no longer addresses a cell of the
/// matrix and cannot be regenerated or edited coherently.
#[derive(Clone)]
pub struct OptionService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl OptionService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Create a new option on a product
    #[instrument(skip(self))]
    pub async fn create_option(
        &self,
        input: CreateOptionInput,
    ) -> Result<product_option::Model, ServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Option name cannot be blank".to_string(),
            ));
        }

        // Owning product must exist
        Product::find_by_id(input.product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", input.product_id))
            })?;

        let option_id = Uuid::new_v4();
        let now = Utc::now();

        let option = product_option::ActiveModel {
            id: Set(option_id),
            product_id: Set(input.product_id),
            name: Set(name),
            position: Set(input.position),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let option = option.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::OptionCreated {
                product_id: input.product_id,
                option_id,
            })
            .await;

        info!("Created option {} on product {}", option_id, input.product_id);
        Ok(option)
    }

    /// Create a new value under an option
    #[instrument(skip(self))]
    pub async fn create_option_value(
        &self,
        input: CreateOptionValueInput,
    ) -> Result<option_value::Model, ServiceError> {
        let raw = input.value.trim().to_string();
        if raw.is_empty() {
            return Err(ServiceError::ValidationError(
                "Option value cannot be blank".to_string(),
            ));
        }

        ProductOption::find_by_id(input.option_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Option {} not found", input.option_id))
            })?;

        // Color-shaped display values are stored in normalized form; plain
        // text passes through untouched.
        let value = normalize_color(&raw).unwrap_or(raw);

        let swatch_hex = match input.swatch_hex.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(swatch) => Some(normalize_color(swatch).ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Invalid color '{}': expected #rgb, #rrggbb or rgb(r, g, b)",
                    swatch
                ))
            })?),
        };

        let value_id = Uuid::new_v4();
        let now = Utc::now();

        let model = option_value::ActiveModel {
            id: Set(value_id),
            option_id: Set(input.option_id),
            value: Set(value),
            swatch_hex: Set(swatch_hex),
            position: Set(input.position),
            visible: Set(input.visible),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::OptionValueCreated {
                option_id: input.option_id,
                value_id,
            })
            .await;

        info!("Created value {} under option {}", value_id, input.option_id);
        Ok(model)
    }

    /// Toggle a value's visibility without deleting it. Variants already
    /// referencing the value stay intact; generation simply stops seeing it.
    #[instrument(skip(self))]
    pub async fn set_value_visibility(
        &self,
        value_id: Uuid,
        visible: bool,
    ) -> Result<option_value::Model, ServiceError> {
        let value = OptionValue::find_by_id(value_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Option value {} not found", value_id)))?;

        let mut active: option_value::ActiveModel = value.into();
        active.visible = Set(visible);
        active.updated_at = Set(Utc::now());
        let value = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::OptionValueUpdated { value_id, visible })
            .await;

        Ok(value)
    }

    /// List a product's options with their values, both in display order
    #[instrument(skip(self))]
    pub async fn list_options(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<OptionWithValues>, ServiceError> {
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
                .order_by_asc(option_value::Column::Position)
                .all(&*self.db)
                .await?
        };

        let mut by_option: std::collections::HashMap<Uuid, Vec<option_value::Model>> =
            std::collections::HashMap::new();
        for value in values {
            by_option.entry(value.option_id).or_default().push(value);
        }

        Ok(options
            .into_iter()
            .map(|option| {
                let values = by_option.remove(&option.id).unwrap_or_default();
                OptionWithValues { option, values }
            })
            .collect())
    }

    /// Delete an option, its values, and every variant whose combination
    /// references one of those values. Returns the number of variants
    /// removed by the cascade.
    #[instrument(skip(self))]
    pub async fn delete_option(&self, option_id: Uuid) -> Result<u64, ServiceError> {
        let option = ProductOption::find_by_id(option_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Option {} not found", option_id)))?;

        let txn = self.db.begin().await?;

        let value_ids: HashSet<Uuid> = OptionValue::find()
            .filter(option_value::Column::OptionId.eq(option_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|v| v.id)
            .collect();

        let variants_removed =
            delete_variants_referencing(&txn, option.product_id, &value_ids).await?;

        OptionValue::delete_many()
            .filter(option_value::Column::OptionId.eq(option_id))
            .exec(&txn)
            .await?;
        ProductOption::delete_by_id(option_id).exec(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OptionDeleted {
                product_id: option.product_id,
                option_id,
                variants_removed,
            })
            .await;

        info!(
            "Deleted option {} ({} dependent variants removed)",
            option_id, variants_removed
        );
        Ok(variants_removed)
    }

    /// Delete a single value and every variant whose combination references
    /// it. Returns the number of variants removed by the cascade.
    #[instrument(skip(self))]
    pub async fn delete_option_value(&self, value_id: Uuid) -> Result<u64, ServiceError> {
        let value = OptionValue::find_by_id(value_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Option value {} not found", value_id)))?;

        let option = ProductOption::find_by_id(value.option_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Option {} not found", value.option_id))
            })?;

        let txn = self.db.begin().await?;

        let mut doomed = HashSet::new();
        doomed.insert(value_id);
        let variants_removed =
            delete_variants_referencing(&txn, option.product_id, &doomed).await?;

        OptionValue::delete_by_id(value_id).exec(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OptionValueDeleted {
                option_id: value.option_id,
                value_id,
                variants_removed,
            })
            .await;

        info!(
            "Deleted value {} ({} dependent variants removed)",
            value_id, variants_removed
        );
        Ok(variants_removed)
    }
}

/// Deletes the product's variants whose combination references any of the
/// given value ids. Combinations are stored as JSON arrays, so membership is
/// decided by parsing rather than string matching.
async fn delete_variants_referencing(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    value_ids: &HashSet<Uuid>,
) -> Result<u64, ServiceError> {
    if value_ids.is_empty() {
        return Ok(0);
    }

    let variants = ProductVariant::find()
        .filter(product_variant::Column::ProductId.eq(product_id))
        .all(txn)
        .await?;

    let doomed: Vec<Uuid> = variants
        .iter()
        .filter(|v| v.value_ids().iter().any(|id| value_ids.contains(id)))
        .map(|v| v.id)
        .collect();

    if doomed.is_empty() {
        return Ok(0);
    }

    let result = ProductVariant::delete_many()
        .filter(product_variant::Column::Id.is_in(doomed))
        .exec(txn)
        .await?;

    Ok(result.rows_affected)
}

/// Input for creating an option
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateOptionInput {
    pub product_id: Uuid,
    pub name: String,
    pub position: i32,
}

/// Input for creating an option value
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateOptionValueInput {
    pub option_id: Uuid,
    pub value: String,
    pub swatch_hex: Option<String>,
    pub position: i32,
    pub visible: bool,
}

/// An option together with its values, in display order
#[derive(Debug, Serialize)]
pub struct OptionWithValues {
    pub option: product_option::Model,
    pub values: Vec<option_value::Model>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_option_input_construction() {
        let input = CreateOptionInput {
            product_id: Uuid::new_v4(),
            name: "Talla".to_string(),
            position: 0,
        };

        assert_eq!(input.name, "Talla");
        assert_eq!(input.position, 0);
    }

    #[test]
    fn create_option_value_input_serialization() {
        let input = CreateOptionValueInput {
            option_id: Uuid::new_v4(),
            value: "Rojo".to_string(),
            swatch_hex: Some("#ff0000".to_string()),
            position: 2,
            visible: true,
        };

        let json = serde_json::to_string(&input).expect("serialization should succeed");
        assert!(json.contains("Rojo"));
        assert!(json.contains("#ff0000"));
    }
}
