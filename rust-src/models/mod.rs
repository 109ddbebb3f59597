//! Data models for sales records and their column schema.

mod dataset;
mod sale_record;
mod schema;

pub use dataset::Dataset;
pub use sale_record::SaleRecord;
pub use schema::{Attribute, Schema, Value};
