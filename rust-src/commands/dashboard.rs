//! Sales dashboard command.

use anyhow::Result;
use tracing::info;

use super::load_selection;
use crate::aggregation::FilterSpec;
use crate::data::LoadOptions;
use crate::visualization::{render_dashboard, DashboardView};


/// Run the dashboard command.
pub fn run(load_options: &LoadOptions, spec: &FilterSpec, json: bool, color: bool) -> Result<()> {
    let (dataset, selection) = load_selection(load_options, spec)?;
    info!(loaded = dataset.len(), selected = selection.len(), "rendering dashboard");

    let view = DashboardView::build(&selection, spec)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_dashboard(&view, color));
    }

    Ok(())
}
