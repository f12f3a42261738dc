/// Catalog handlers: products, options, and the variant matrix
pub mod options;
pub mod products;
pub mod variants;
