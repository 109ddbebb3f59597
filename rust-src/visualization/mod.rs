//! Visualization layer for dashboards and charts.

mod chart;
mod dashboard;
mod format;

pub use chart::{export_chart_png, export_chart_svg, open_file, Theme};
pub use dashboard::{render_dashboard, DashboardView};
pub use format::{format_count, format_currency};
