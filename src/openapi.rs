use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.3.0",
        description = r#"
# Storefront Catalog API

Administrative backend for the product catalog: options, option values, and
the variant matrix.

## Variant generation

`POST /api/v1/products/{id}/variants/generate` expands the Cartesian product
of the product's visible option values and creates the combinations that do
not exist yet. The call is idempotent: existing combinations are never
duplicated, and a repeat call with unchanged inputs reports `created = 0`.

## Stock model

A product either tracks its own stock (an explicitly set number, which is
authoritative) or delegates to its variants: with product stock unset, the
effective figure is the sum of tracked variant stocks, reported as null when
nothing is tracked.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Products", description = "Product management endpoints"),
        (name = "Options", description = "Option and option-value management"),
        (name = "Variants", description = "Variant matrix generation and editing")
    ),
    paths(
        crate::handlers::catalog::products::create_product,
        crate::handlers::catalog::products::get_product,
        crate::handlers::catalog::products::update_product,
        crate::handlers::catalog::products::list_products,
        crate::handlers::catalog::options::create_option,
        crate::handlers::catalog::options::list_options,
        crate::handlers::catalog::options::create_option_value,
        crate::handlers::catalog::options::update_value_visibility,
        crate::handlers::catalog::options::delete_option,
        crate::handlers::catalog::options::delete_option_value,
        crate::handlers::catalog::options::apply_template,
        crate::handlers::catalog::variants::generate_variants,
        crate::handlers::catalog::variants::list_variants,
        crate::handlers::catalog::variants::update_variant,
        crate::handlers::catalog::variants::delete_variant,
    ),
    components(
        schemas(
            crate::handlers::catalog::products::CreateProductRequest,
            crate::handlers::catalog::products::UpdateProductRequest,
            crate::handlers::catalog::products::ProductResponse,
            crate::handlers::catalog::products::ProductSummaryResponse,
            crate::handlers::catalog::products::ProductListResponse,
            crate::handlers::catalog::options::CreateOptionRequest,
            crate::handlers::catalog::options::CreateOptionValueRequest,
            crate::handlers::catalog::options::UpdateVisibilityRequest,
            crate::handlers::catalog::options::ApplyTemplateRequest,
            crate::handlers::catalog::options::OptionResponse,
            crate::handlers::catalog::options::OptionValueResponse,
            crate::handlers::catalog::variants::GenerateVariantsRequest,
            crate::handlers::catalog::variants::GenerateAxisRequest,
            crate::handlers::catalog::variants::GenerateVariantsResponse,
            crate::handlers::catalog::variants::UpdateVariantRequest,
            crate::handlers::catalog::variants::VariantResponse,
            crate::handlers::catalog::variants::VariantSelectionResponse,
            crate::handlers::catalog::variants::VariantSummaryResponse,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
