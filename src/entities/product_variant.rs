use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A concrete purchasable SKU: one option value per option, with its own
/// price/stock/active state.
///
/// `combination_key` is the canonical form of `option_value_ids` (value-id
/// strings sorted and joined with `|`). A unique index over
/// `(product_id, combination_key)` is the arbiter of combination uniqueness
/// under concurrent generation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_variants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    /// NULL means "sell at the product's base price".
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub price: Option<Decimal>,
    /// NULL means "stock not tracked for this variant". Distinct from 0.
    #[sea_orm(nullable)]
    pub stock: Option<i32>,
    pub is_active: bool,
    /// JSON array of option-value UUIDs, one per option, in option order.
    #[sea_orm(column_type = "Json")]
    pub option_value_ids: Json,
    pub combination_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parses the stored combination back into value ids. Entries that are
    /// not valid UUIDs are dropped rather than failing the whole read.
    pub fn value_ids(&self) -> Vec<Uuid> {
        self.option_value_ids
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(|s| Uuid::parse_str(s).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}
