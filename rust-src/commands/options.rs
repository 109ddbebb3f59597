//! Lists the values each filter can take.

use anyhow::Result;

use super::load_dataset;
use crate::data::LoadOptions;
use crate::models::Attribute;
use crate::visualization::{format_count, format_currency};


/// Run the options command.
pub fn run(load_options: &LoadOptions) -> Result<()> {
    let dataset = load_dataset(load_options)?;

    println!("\x1b[1m{} rows loaded from {}\x1b[0m", format_count(dataset.len()), load_options.path.display());
    if dataset.skipped_rows() > 0 {
        println!("\x1b[33m! {} rows skipped\x1b[0m", format_count(dataset.skipped_rows()));
    }
    println!();

    for attribute in Attribute::ALL {
        if !attribute.is_categorical() || !dataset.schema().contains(attribute) {
            continue;
        }

        let values = dataset.distinct(attribute)?;
        let joined = values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        println!("{} ({}): {}", attribute.label(), attribute.column(), joined);
    }

    if let Some((from, to)) = dataset.year_bounds() {
        println!("{} ({}): {}..={}", Attribute::Year.label(), Attribute::Year.column(), from, to);
    }
    if let Some((min, max)) = dataset.sale_bounds() {
        println!(
            "{} ({}): {} to {}",
            Attribute::Sale.label(),
            Attribute::Sale.column(),
            format_currency(min),
            format_currency(max)
        );
    }
    if let Some((from, to)) = dataset.day_bounds() {
        println!(
            "{} ({}): {} to {}",
            Attribute::Day.label(),
            Attribute::Day.column(),
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );
    }

    Ok(())
}
