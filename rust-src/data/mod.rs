//! Data access layer: spreadsheet loading, caching and export.

mod cache;
mod workbook;
mod xlsx_export;

pub use cache::DatasetCache;
pub use workbook::{load_workbook, LoadOptions};
pub use xlsx_export::{to_xlsx_buffer, write_xlsx};
