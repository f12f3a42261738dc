use crate::entities::{option_value, product_option};
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::services::catalog::{CreateOptionInput, CreateOptionValueInput, QuickTemplate};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for option and option-value endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products/:id/options",
            post(create_option).get(list_options),
        )
        .route("/products/:id/template", post(apply_template))
        .route("/options/:option_id/values", post(create_option_value))
        .route("/options/:option_id", delete(delete_option))
        .route(
            "/option-values/:value_id/visibility",
            put(update_value_visibility),
        )
        .route("/option-values/:value_id", delete(delete_option_value))
}

/// Create an option on a product
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/options",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = CreateOptionRequest,
    responses(
        (status = 201, description = "Option created", body = OptionResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Options"
)]
pub async fn create_option(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<CreateOptionRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let option = state
        .services
        .options
        .create_option(CreateOptionInput {
            product_id,
            name: payload.name,
            position: payload.position,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(OptionResponse::from_model(option, vec![])))
}

/// List a product's options with their values
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/options",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Options with values", body = [OptionResponse])
    ),
    tag = "Options"
)]
pub async fn list_options(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let options = state
        .services
        .options
        .list_options(product_id)
        .await
        .map_err(map_service_error)?;

    let response: Vec<OptionResponse> = options
        .into_iter()
        .map(|entry| {
            OptionResponse::from_model(
                entry.option,
                entry
                    .values
                    .into_iter()
                    .map(OptionValueResponse::from)
                    .collect(),
            )
        })
        .collect();

    Ok(success_response(response))
}

/// Create a value under an option
#[utoipa::path(
    post,
    path = "/api/v1/options/{option_id}/values",
    params(("option_id" = Uuid, Path, description = "Option id")),
    request_body = CreateOptionValueRequest,
    responses(
        (status = 201, description = "Value created", body = OptionValueResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Option not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Options"
)]
pub async fn create_option_value(
    State(state): State<AppState>,
    Path(option_id): Path<Uuid>,
    Json(payload): Json<CreateOptionValueRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let value = state
        .services
        .options
        .create_option_value(CreateOptionValueInput {
            option_id,
            value: payload.value,
            swatch_hex: payload.swatch_hex,
            position: payload.position,
            visible: payload.visible.unwrap_or(true),
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(OptionValueResponse::from(value)))
}

/// Toggle a value's visibility. Hidden values are excluded from generation
/// but variants referencing them stay intact.
#[utoipa::path(
    put,
    path = "/api/v1/option-values/{value_id}/visibility",
    params(("value_id" = Uuid, Path, description = "Option value id")),
    request_body = UpdateVisibilityRequest,
    responses(
        (status = 200, description = "Visibility updated", body = OptionValueResponse),
        (status = 404, description = "Value not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Options"
)]
pub async fn update_value_visibility(
    State(state): State<AppState>,
    Path(value_id): Path<Uuid>,
    Json(payload): Json<UpdateVisibilityRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let value = state
        .services
        .options
        .set_value_visibility(value_id, payload.visible)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(OptionValueResponse::from(value)))
}

/// Delete an option, cascading to its values and dependent variants
#[utoipa::path(
    delete,
    path = "/api/v1/options/{option_id}",
    params(("option_id" = Uuid, Path, description = "Option id")),
    responses(
        (status = 204, description = "Option deleted"),
        (status = 404, description = "Option not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Options"
)]
pub async fn delete_option(
    State(state): State<AppState>,
    Path(option_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .options
        .delete_option(option_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Delete an option value, cascading to dependent variants
#[utoipa::path(
    delete,
    path = "/api/v1/option-values/{value_id}",
    params(("value_id" = Uuid, Path, description = "Option value id")),
    responses(
        (status = 204, description = "Value deleted"),
        (status = 404, description = "Value not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Options"
)]
pub async fn delete_option_value(
    State(state): State<AppState>,
    Path(value_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .options
        .delete_option_value(value_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Seed a product with a quick template's option set
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/template",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = ApplyTemplateRequest,
    responses(
        (status = 204, description = "Template applied"),
        (status = 400, description = "Unknown template", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Product already has options", body = crate::errors::ErrorResponse)
    ),
    tag = "Options"
)]
pub async fn apply_template(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ApplyTemplateRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let template = QuickTemplate::from_str(payload.template.trim()).map_err(|_| {
        ApiError::ValidationError(format!("Unknown template '{}'", payload.template))
    })?;

    state
        .services
        .templates
        .apply_template(product_id, template)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOptionRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOptionValueRequest {
    #[validate(length(min = 1, max = 255))]
    pub value: String,
    /// `#rgb`, `#rrggbb` or `rgb(r, g, b)`; normalized to `#rrggbb` on write
    pub swatch_hex: Option<String>,
    #[serde(default)]
    pub position: i32,
    pub visible: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVisibilityRequest {
    pub visible: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyTemplateRequest {
    /// Template name, e.g. "ropa"
    pub template: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OptionResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub position: i32,
    pub values: Vec<OptionValueResponse>,
}

impl OptionResponse {
    fn from_model(model: product_option::Model, values: Vec<OptionValueResponse>) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            name: model.name,
            position: model.position,
            values,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OptionValueResponse {
    pub id: Uuid,
    pub option_id: Uuid,
    pub value: String,
    pub swatch_hex: Option<String>,
    pub position: i32,
    pub visible: bool,
}

impl From<option_value::Model> for OptionValueResponse {
    fn from(model: option_value::Model) -> Self {
        Self {
            id: model.id,
            option_id: model.option_id,
            value: model.value,
            swatch_hex: model.swatch_hex,
            position: model.position,
            visible: model.visible,
        }
    }
}
