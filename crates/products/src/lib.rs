//! Catalog records for the safety-equipment storefront.
//!
//! This crate models the product collection handed over by the persistence
//! layer: categorized products with a category-specific attribute bag, frozen
//! into immutable snapshots. Pure data (no IO, no HTTP, no storage).

pub mod attribute;
pub mod category;
pub mod product;
pub mod snapshot;

pub use attribute::AttributeValue;
pub use category::Category;
pub use product::Product;
pub use snapshot::{CatalogSnapshot, RejectedRecord};
