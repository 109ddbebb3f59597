//! Chart export command.

use std::path::PathBuf;

use anyhow::Result;

use super::load_selection;
use crate::aggregation::{aggregate, FilterSpec, GroupBy, Reduction};
use crate::data::LoadOptions;
use crate::visualization::{export_chart_png, export_chart_svg, open_file, Theme};


/// Options of one chart export.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub group_by: GroupBy,
    pub mean: bool,
    pub svg: bool,
    pub theme: Theme,
    pub title: Option<String>,
    pub output: Option<PathBuf>,
    pub open: bool,
}


impl ChartRequest {
    fn reduction(&self) -> Reduction {
        if self.mean {
            Reduction::Mean
        } else {
            Reduction::Sum
        }
    }

    fn format_type(&self) -> &'static str {
        if self.svg { "svg" } else { "png" }
    }

    /// Output path, defaulting to e.g. `sales-by-ano-categoria.png`.
    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let columns = self
                .group_by
                .attributes()
                .iter()
                .map(|attribute| attribute.column().to_lowercase())
                .collect::<Vec<_>>()
                .join("-");
            PathBuf::from(format!("sales-by-{}.{}", columns, self.format_type()))
        })
    }
}


/// Run the chart command.
pub fn run(load_options: &LoadOptions, spec: &FilterSpec, request: &ChartRequest) -> Result<()> {
    let (_, selection) = load_selection(load_options, spec)?;
    let aggregate = aggregate(&selection, request.group_by, request.reduction())?;

    if aggregate.is_empty() {
        println!("No sales match the current filters ({spec}).");
        return Ok(());
    }

    let output_path = request.output_path();
    let title = request.title.as_deref();

    println!("Exporting to {}...", request.format_type().to_uppercase());
    if request.svg {
        export_chart_svg(&aggregate, &output_path, request.theme, title)?;
    } else {
        export_chart_png(&aggregate, &output_path, request.theme, title)?;
    }

    println!("\x1b[32m+ Exported to: {}\x1b[0m", output_path.display());

    if request.open {
        println!("Opening {}...", request.format_type().to_uppercase());
        open_file(&output_path)?;
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attribute;

    fn request(group_by: GroupBy, svg: bool) -> ChartRequest {
        ChartRequest {
            group_by,
            mean: false,
            svg,
            theme: Theme::Light,
            title: None,
            output: None,
            open: false,
        }
    }

    #[test]
    fn test_default_output_path() {
        let single = request(GroupBy::Single(Attribute::Category), false);
        assert_eq!(single.output_path(), PathBuf::from("sales-by-categoria.png"));

        let pair = request(GroupBy::Pair(Attribute::Year, Attribute::Category), true);
        assert_eq!(pair.output_path(), PathBuf::from("sales-by-ano-categoria.svg"));
    }

    #[test]
    fn test_reduction() {
        let mut chart = request(GroupBy::Single(Attribute::Manager), false);
        assert_eq!(chart.reduction(), Reduction::Sum);
        chart.mean = true;
        assert_eq!(chart.reduction(), Reduction::Mean);
    }
}
