/// Catalog services module - the variant matrix engine and its collaborators
pub mod color;
pub mod matrix;
pub mod option_service;
pub mod product_service;
pub mod stock_service;
pub mod template_service;
pub mod variant_service;

// Re-export services for convenience
pub use option_service::{CreateOptionInput, CreateOptionValueInput, OptionService,
    OptionWithValues};
pub use product_service::{CreateProductInput, ProductSearchQuery, ProductService,
    UpdateProductInput};
pub use stock_service::StockService;
pub use template_service::{QuickTemplate, TemplateService};
pub use variant_service::{
    AxisSelection, GenerateVariantsInput, GenerateVariantsResult, UpdateVariantInput,
    VariantService, VariantView,
};
