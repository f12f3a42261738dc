use crate::{
    entities::{product, Product, ProductModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// Slim product CRUD: just enough surface to own the base price and the
/// product-level stock field the variant engine reads.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Create a new product
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Product name cannot be blank".to_string(),
            ));
        }
        if input.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "price cannot be negative".to_string(),
            ));
        }
        if matches!(input.stock, Some(stock) if stock < 0) {
            return Err(ServiceError::ValidationError(
                "stock cannot be negative".to_string(),
            ));
        }

        let product_id = Uuid::new_v4();
        let now = Utc::now();

        let product = product::ActiveModel {
            id: Set(product_id),
            name: Set(name),
            price: Set(input.price.round_dp(2)),
            stock: Set(input.stock),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let product = product.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product_id))
            .await;

        info!("Created product: {}", product_id);
        Ok(product)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Update a product. `stock` distinguishes absent (keep) from explicit
    /// null (switch to per-variant stock management).
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let product = self.get_product(product_id).await?;

        if let Some(price) = &input.price {
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

        let mut active: product::ActiveModel = product.into();
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Product name cannot be blank".to_string(),
                ));
            }
            active.name = Set(name);
        }
        if let Some(price) = input.price {
            active.price = Set(price.round_dp(2));
        }
        if let Some(stock) = input.stock {
            active.stock = Set(stock);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let product = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(product_id))
            .await;

        info!("Updated product: {}", product_id);
        Ok(product)
    }

    /// Search products
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        query: ProductSearchQuery,
    ) -> Result<ProductSearchResult, ServiceError> {
        let mut db_query = Product::find();

        if let Some(search) = &query.search {
            db_query = db_query.filter(product::Column::Name.contains(search));
        }
        if let Some(is_active) = query.is_active {
            db_query = db_query.filter(product::Column::IsActive.eq(is_active));
        }

        let total = db_query.clone().count(&*self.db).await?;

        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = query.offset.unwrap_or(0);

        let products = db_query
            .order_by_desc(product::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&*self.db)
            .await?;

        Ok(ProductSearchResult { products, total })
    }
}

/// Input for creating a product
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateProductInput {
    pub name: String,
    pub price: Decimal,
    pub stock: Option<i32>,
    pub is_active: bool,
}

/// Input for updating a product; built by the HTTP layer's patch encoding
#[derive(Debug, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<Option<i32>>,
    pub is_active: Option<bool>,
}

/// Product search query
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSearchQuery {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Product search result
#[derive(Debug, Serialize)]
pub struct ProductSearchResult {
    pub products: Vec<ProductModel>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn create_product_input_minimal() {
        let input = CreateProductInput {
            name: "Camiseta".to_string(),
            price: dec!(19.99),
            stock: None,
            is_active: true,
        };

        assert_eq!(input.name, "Camiseta");
        assert!(input.stock.is_none());
    }

    #[test]
    fn update_product_input_partial() {
        let input = UpdateProductInput {
            price: Some(dec!(24.99)),
            ..Default::default()
        };

        assert!(input.name.is_none());
        assert!(input.price.is_some());
        assert!(input.stock.is_none());
    }

    #[test]
    fn update_product_input_can_clear_stock() {
        let input = UpdateProductInput {
            stock: Some(None),
            ..Default::default()
        };

        // Explicit null switches the product to per-variant stock
        assert_eq!(input.stock, Some(None));
    }

    #[test]
    fn search_query_pagination_caps() {
        let requested: u64 = 500;
        assert_eq!(requested.min(MAX_LIMIT), 100);
        assert_eq!(DEFAULT_LIMIT, 20);
    }
}
