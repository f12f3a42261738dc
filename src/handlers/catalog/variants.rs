use crate::entities::product_variant;
use crate::handlers::common::{
    map_service_error, no_content_response, patch_decimal, patch_i32, success_response,
};
use crate::services::catalog::{
    AxisSelection, GenerateVariantsInput, UpdateVariantInput, VariantView,
};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, State},
    routing::{get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Creates the router for variant endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products/:id/variants/generate",
            post(generate_variants),
        )
        .route("/products/:id/variants", get(list_variants))
        .route(
            "/variants/:variant_id",
            put(update_variant).delete(delete_variant),
        )
}

/// Expand the product's option matrix into variants.
///
/// Idempotent: combinations that already exist are left untouched and a
/// second call with unchanged inputs reports `created = 0`.
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/variants/generate",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = GenerateVariantsRequest,
    responses(
        (status = 200, description = "Generation outcome", body = GenerateVariantsResponse),
        (status = 400, description = "No values to combine", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Variants"
)]
pub async fn generate_variants(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<GenerateVariantsRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    // The base price defaults to the product's own price when the caller
    // does not supply one.
    let base_price = match payload.base_price {
        Some(price) => price,
        None => {
            state
                .services
                .products
                .get_product(product_id)
                .await
                .map_err(map_service_error)?
                .price
        }
    };

    let result = state
        .services
        .variants
        .generate_variants(GenerateVariantsInput {
            product_id,
            axes: payload
                .options
                .into_iter()
                .map(|axis| AxisSelection {
                    option_id: axis.option_id,
                    value_ids: axis.values.unwrap_or_default(),
                })
                .collect(),
            base_price,
        })
        .await
        .map_err(map_service_error)?;

    Ok(success_response(GenerateVariantsResponse {
        created: result.created,
    }))
}

/// List a product's variants with human-readable combinations
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/variants",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Variant list", body = [VariantResponse]),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Variants"
)]
pub async fn list_variants(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let variants = state
        .services
        .variants
        .list_variants(product_id)
        .await
        .map_err(map_service_error)?;

    let response: Vec<VariantResponse> = variants.into_iter().map(VariantResponse::from).collect();
    Ok(success_response(response))
}

/// Partially update a variant's price, stock, or active flag.
///
/// `price` and `stock` accept explicit null (or a blank string) to unset:
/// unset price sells at the base price, unset stock means untracked.
#[utoipa::path(
    put,
    path = "/api/v1/variants/{variant_id}",
    params(("variant_id" = Uuid, Path, description = "Variant id")),
    request_body = UpdateVariantRequest,
    responses(
        (status = 200, description = "Variant updated", body = VariantSummaryResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Variants"
)]
pub async fn update_variant(
    State(state): State<AppState>,
    Path(variant_id): Path<Uuid>,
    Json(payload): Json<UpdateVariantRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let variant = state
        .services
        .variants
        .update_variant(
            variant_id,
            UpdateVariantInput {
                price: payload.price,
                stock: payload.stock,
                is_active: payload.is_active,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(VariantSummaryResponse::from(variant)))
}

/// Delete a variant. Removes the row only; nothing is regenerated.
#[utoipa::path(
    delete,
    path = "/api/v1/variants/{variant_id}",
    params(("variant_id" = Uuid, Path, description = "Variant id")),
    responses(
        (status = 204, description = "Variant deleted"),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Variants"
)]
pub async fn delete_variant(
    State(state): State<AppState>,
    Path(variant_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .variants
        .delete_variant(variant_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateVariantsRequest {
    pub options: Vec<GenerateAxisRequest>,
    /// Defaults to the product's own price
    #[schema(value_type = Option<f64>)]
    pub base_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateAxisRequest {
    pub option_id: Uuid,
    /// Restrict the axis to these values; omitted means every visible value
    pub values: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateVariantsResponse {
    pub created: u64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateVariantRequest {
    /// Absent keeps the price; null or a blank string unsets it
    #[serde(default, deserialize_with = "patch_decimal")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Option<Decimal>>,
    /// Absent keeps the stock; null or a blank string unsets it
    #[serde(default, deserialize_with = "patch_i32")]
    #[schema(value_type = Option<i32>)]
    pub stock: Option<Option<i32>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VariantSelectionResponse {
    pub option_id: Uuid,
    pub option_name: String,
    pub value_id: Uuid,
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VariantResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    /// The variant's price, falling back to the product's base price
    #[schema(value_type = f64)]
    pub effective_price: Decimal,
    pub stock: Option<i32>,
    pub is_active: bool,
    /// e.g. "Talla: M / Color: Rojo"
    pub display_name: String,
    pub selections: Vec<VariantSelectionResponse>,
}

impl From<VariantView> for VariantResponse {
    fn from(view: VariantView) -> Self {
        Self {
            id: view.id,
            product_id: view.product_id,
            price: view.price,
            effective_price: view.effective_price,
            stock: view.stock,
            is_active: view.is_active,
            display_name: view.display_name,
            selections: view
                .selections
                .into_iter()
                .map(|s| VariantSelectionResponse {
                    option_id: s.option_id,
                    option_name: s.option_name,
                    value_id: s.value_id,
                    value: s.value,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VariantSummaryResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub is_active: bool,
}

impl From<product_variant::Model> for VariantSummaryResponse {
    fn from(model: product_variant::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            price: model.price,
            stock: model.stock,
            is_active: model.is_active,
        }
    }
}
