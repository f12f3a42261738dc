use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One admissible value of a product option (e.g. "M", "Rojo").
///
/// Hidden values (`visible = false`) are excluded from matrix generation but
/// never deleted implicitly, so variants already referencing them stay valid.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_option_values")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub option_id: Uuid,
    pub value: String,
    /// Normalized `#rrggbb` swatch for color options. Normalization happens
    /// at write time; reads never reinterpret the stored string.
    #[sea_orm(nullable)]
    pub swatch_hex: Option<String>,
    pub position: i32,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product_option::Entity",
        from = "Column::OptionId",
        to = "super::product_option::Column::Id"
    )]
    ProductOption,
}

impl Related<super::product_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductOption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
