//! Configuration and settings for the sales dashboard.

mod settings;

pub use settings::{
    Settings,
    BAR_WIDTH,
    DEFAULT_ROW_LIMIT,
    DEFAULT_SHEET_NAME,
    DEFAULT_WORKBOOK,
    SHEET_ENV,
    WORKBOOK_ENV,
};
