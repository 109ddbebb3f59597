//! Filtering and aggregation of sales records.

mod aggregate;
mod filter;

pub use aggregate::{aggregate, summarize, Aggregate, GroupBy, Reduction, Stack, Summary};
pub use filter::{filter, FilterSpec};
