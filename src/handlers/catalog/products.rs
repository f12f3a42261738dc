use crate::entities::product;
use crate::handlers::common::{
    created_response, map_service_error, patch_i32, success_response, validate_input,
};
use crate::services::catalog::{CreateProductInput, ProductSearchQuery, UpdateProductInput};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Custom validator for Decimal minimum value
fn validate_decimal_min_zero(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("decimal_min_zero"));
    }
    Ok(())
}

/// Creates the router for product endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product).get(list_products))
        .route("/products/:id", get(get_product).put(update_product))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .products
        .create_product(CreateProductInput {
            name: payload.name,
            price: payload.price,
            stock: payload.stock,
            is_active: payload.is_active.unwrap_or(true),
        })
        .await
        .map_err(map_service_error)?;

    let effective_stock = state
        .services
        .stock
        .resolve_product_stock(&product)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(ProductResponse::from_model(
        product,
        effective_stock,
    )))
}

/// Get a product with its resolved effective stock
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product detail", body = ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .get_product(id)
        .await
        .map_err(map_service_error)?;

    // The editor shows a computed placeholder for products whose own stock
    // is unset; the figure is derived on read, not persisted.
    let effective_stock = state
        .services
        .stock
        .resolve_product_stock(&product)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ProductResponse::from_model(
        product,
        effective_stock,
    )))
}

/// Update a product. A blank or null stock switches the product to
/// per-variant stock management.
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .update_product(
            id,
            UpdateProductInput {
                name: payload.name,
                price: payload.price,
                stock: payload.stock,
                is_active: payload.is_active,
            },
        )
        .await
        .map_err(map_service_error)?;

    let effective_stock = state
        .services
        .stock
        .resolve_product_stock(&product)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ProductResponse::from_model(
        product,
        effective_stock,
    )))
}

/// List products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ListProductsParams),
    responses(
        (status = 200, description = "Product list", body = ProductListResponse)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListProductsParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let result = state
        .services
        .products
        .search_products(ProductSearchQuery {
            search: params.search,
            is_active: params.is_active,
            limit: params.limit,
            offset: params.offset,
        })
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ProductListResponse {
        products: result
            .products
            .into_iter()
            .map(ProductSummaryResponse::from)
            .collect(),
        total: result.total,
    }))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(custom = "validate_decimal_min_zero")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    /// Absent keeps the current stock; null or a blank string unsets it.
    #[serde(default, deserialize_with = "patch_i32")]
    #[schema(value_type = Option<i32>)]
    pub stock: Option<Option<i32>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListProductsParams {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub stock: Option<i32>,
    /// Admin override when set, else the variant total, else null
    pub effective_stock: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    fn from_model(model: product::Model, effective_stock: Option<i64>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price: model.price,
            stock: model.stock,
            effective_stock,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummaryResponse {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub stock: Option<i32>,
    pub is_active: bool,
}

impl From<product::Model> for ProductSummaryResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price: model.price,
            stock: model.stock,
            is_active: model.is_active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<ProductSummaryResponse>,
    pub total: u64,
}
