/// Catalog entities module
pub mod option_value;
pub mod product;
pub mod product_option;
pub mod product_variant;

// Re-export entities
pub use option_value::{Entity as OptionValue, Model as OptionValueModel};
pub use product::{Entity as Product, Model as ProductModel};
pub use product_option::{Entity as ProductOption, Model as ProductOptionModel};
pub use product_variant::{Entity as ProductVariant, Model as ProductVariantModel};
