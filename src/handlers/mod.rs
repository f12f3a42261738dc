pub mod catalog;
pub mod common;

use crate::events::EventSender;
use crate::services::catalog::{
    OptionService, ProductService, StockService, TemplateService, VariantService,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Aggregated services used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub options: Arc<OptionService>,
    pub variants: Arc<VariantService>,
    pub stock: Arc<StockService>,
    pub templates: Arc<TemplateService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self {
            products: Arc::new(ProductService::new(db.clone(), event_sender.clone())),
            options: Arc::new(OptionService::new(db.clone(), event_sender.clone())),
            variants: Arc::new(VariantService::new(db.clone(), event_sender.clone())),
            stock: Arc::new(StockService::new(db.clone())),
            templates: Arc::new(TemplateService::new(db, event_sender)),
        }
    }
}
