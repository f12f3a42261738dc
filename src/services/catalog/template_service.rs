use crate::{
    entities::{option_value, product_option, Product, ProductOption},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{info, instrument};
use uuid::Uuid;

const TALLA_VALUES: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];
const COLOR_VALUES: [(&str, &str); 4] = [
    ("Negro", "#000000"),
    ("Blanco", "#ffffff"),
    ("Rojo", "#ff0000"),
    ("Azul", "#0000ff"),
];

/// Built-in quick templates for seeding a product's option set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum QuickTemplate {
    /// Apparel: Talla (XS..XXL) + Color with swatches
    Ropa,
}

/// Seeds a product with a canned option/value set so an admin can go
/// straight to generation. Orchestration only; no combinatorics.
#[derive(Clone)]
pub struct TemplateService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl TemplateService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Apply a quick template to a product without options.
    ///
    /// Refuses with `TemplateNotApplicable` when the product already has
    /// any option; the application is transactional so a refused or failed
    /// call writes nothing.
    #[instrument(skip(self))]
    pub async fn apply_template(
        &self,
        product_id: Uuid,
        template: QuickTemplate,
    ) -> Result<(), ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let txn = self.db.begin().await?;

        let existing = ProductOption::find()
            .filter(product_option::Column::ProductId.eq(product_id))
            .count(&txn)
            .await?;
        if existing > 0 {
            txn.rollback().await?;
            return Err(ServiceError::TemplateNotApplicable(format!(
                "Product {} already has {} option(s)",
                product_id, existing
            )));
        }

        match template {
            QuickTemplate::Ropa => apply_ropa(&txn, product_id).await?,
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::TemplateApplied {
                product_id,
                template: template.to_string(),
            })
            .await;

        info!("Applied template '{}' to product {}", template, product_id);
        Ok(())
    }
}

async fn apply_ropa(txn: &DatabaseTransaction, product_id: Uuid) -> Result<(), ServiceError> {
    let talla_id = insert_option(txn, product_id, "Talla", 0).await?;
    for (position, value) in TALLA_VALUES.iter().enumerate() {
        insert_value(txn, talla_id, value, None, position as i32).await?;
    }

    let color_id = insert_option(txn, product_id, "Color", 1).await?;
    for (position, (value, hex)) in COLOR_VALUES.iter().enumerate() {
        insert_value(txn, color_id, value, Some(hex), position as i32).await?;
    }

    Ok(())
}

async fn insert_option(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    name: &str,
    position: i32,
) -> Result<Uuid, ServiceError> {
    let option_id = Uuid::new_v4();
    let now = Utc::now();

    product_option::ActiveModel {
        id: Set(option_id),
        product_id: Set(product_id),
        name: Set(name.to_string()),
        position: Set(position),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;

    Ok(option_id)
}

async fn insert_value(
    txn: &DatabaseTransaction,
    option_id: Uuid,
    value: &str,
    swatch_hex: Option<&str>,
    position: i32,
) -> Result<(), ServiceError> {
    let now = Utc::now();

    option_value::ActiveModel {
        id: Set(Uuid::new_v4()),
        option_id: Set(option_id),
        value: Set(value.to_string()),
        swatch_hex: Set(swatch_hex.map(str::to_string)),
        position: Set(position),
        visible: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;

    Ok(())
}
