//! Export command for the filtered rows.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::load_selection;
use crate::aggregation::FilterSpec;
use crate::data::{to_xlsx_buffer, write_xlsx, LoadOptions};
use crate::visualization::format_count;

const DEFAULT_OUTPUT: &str = "selection.xlsx";


/// Run the export command. An output of `-` streams the workbook to stdout.
pub fn run(load_options: &LoadOptions, spec: &FilterSpec, output: Option<&str>) -> Result<()> {
    let (_, selection) = load_selection(load_options, spec)?;
    let output = output.unwrap_or(DEFAULT_OUTPUT);

    if output == "-" {
        let bytes = to_xlsx_buffer(&selection)?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&bytes).context("Failed to write workbook to stdout")?;
        stdout.flush()?;
        return Ok(());
    }

    let output_path = Path::new(output);
    write_xlsx(&selection, output_path)?;

    println!(
        "\x1b[32m+ Exported {} rows to: {}\x1b[0m",
        format_count(selection.len()),
        output_path.display()
    );

    Ok(())
}
