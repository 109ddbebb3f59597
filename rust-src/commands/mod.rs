//! CLI command implementations.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use crate::aggregation::{filter, FilterSpec};
use crate::data::{DatasetCache, LoadOptions};
use crate::models::Dataset;

pub mod chart;
pub mod dashboard;
pub mod export;
pub mod options;


/// Fetch the cached dataset and apply the filters to it.
fn load_selection(load_options: &LoadOptions, spec: &FilterSpec) -> Result<(Arc<Dataset>, Dataset)> {
    let dataset = load_dataset(load_options)?;
    let selection = filter(&dataset, spec)?;
    Ok((dataset, selection))
}


/// Fetch the cached dataset, warning about rows dropped during load.
fn load_dataset(load_options: &LoadOptions) -> Result<Arc<Dataset>> {
    let dataset = DatasetCache::global()
        .get_or_load(load_options)
        .with_context(|| format!("Could not load sales data (sheet '{}')", load_options.sheet))?;

    if dataset.skipped_rows() > 0 {
        warn!(skipped = dataset.skipped_rows(), "some rows could not be read and were skipped");
    }

    Ok(dataset)
}
