//! Record model for extracted listings
//!
//! # Components
//!
//! - `Schema`: the ordered, immutable column set shared by extraction and output
//! - `ListingRecord`: one listing, holding an optional value for every schema field
//! - `FieldValue`: a known value, either text or a presence flag

mod listing;
mod schema;

// Re-export main types
pub use listing::{FieldValue, ListingRecord};
pub use schema::{
    FieldKind, FieldSpec, Schema, SchemaError, AREA_FIELD, PRICE_FIELD, PUBLISHED_FIELD,
    URL_FIELD,
};
