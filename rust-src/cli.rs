//! CLI definitions using clap.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::aggregation::{FilterSpec, GroupBy};
use crate::commands;
use crate::config::{Settings, SHEET_ENV, WORKBOOK_ENV};
use crate::data::LoadOptions;
use crate::logging;
use crate::models::Attribute;
use crate::visualization::Theme;


/// Sales dashboard - filter, aggregate and chart spreadsheet sales data
#[derive(Parser)]
#[command(name = "sdash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}


/// Where the sales sheet is read from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Spreadsheet file to read
    #[arg(short, long, env = WORKBOOK_ENV, global = true)]
    file: Option<PathBuf>,

    /// Sheet holding the sales table
    #[arg(long, env = SHEET_ENV, global = true)]
    sheet: Option<String>,

    /// Maximum number of data rows to read
    #[arg(long, global = true)]
    row_limit: Option<usize>,

    /// Optional columns to read, e.g. MES,DIA (default: all present)
    #[arg(long, value_delimiter = ',', global = true)]
    columns: Vec<Attribute>,
}


impl SourceArgs {
    /// Resolve load options: flags and environment over the settings file over defaults.
    pub fn load_options(&self, settings: &Settings) -> LoadOptions {
        let options = LoadOptions::new(settings.workbook_or(self.file.clone()), &settings.sheet_or(self.sheet.clone()))
            .with_row_limit(settings.row_limit_or(self.row_limit));

        if self.columns.is_empty() {
            options
        } else {
            options.with_columns(self.columns.iter().copied())
        }
    }
}


/// Sidebar-style filters. Omitted filters keep every row.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Keep only this manager (repeatable)
    #[arg(long = "manager", value_name = "NAME")]
    managers: Vec<String>,

    /// Keep only this category (repeatable)
    #[arg(long = "category", value_name = "NAME")]
    categories: Vec<String>,

    /// Keep only this month (repeatable)
    #[arg(long = "month", value_name = "NAME")]
    months: Vec<String>,

    /// Keep only this year (repeatable)
    #[arg(long = "year", value_name = "YEAR", conflicts_with_all = ["year_from", "year_to"])]
    years: Vec<i32>,

    /// First year of an inclusive year range
    #[arg(long)]
    year_from: Option<i32>,

    /// Last year of an inclusive year range
    #[arg(long)]
    year_to: Option<i32>,

    /// Minimum sale amount (inclusive)
    #[arg(long)]
    sale_min: Option<f64>,

    /// Maximum sale amount (inclusive)
    #[arg(long)]
    sale_max: Option<f64>,

    /// First day, YYYY-MM-DD (inclusive)
    #[arg(long)]
    day_from: Option<NaiveDate>,

    /// Last day, YYYY-MM-DD (inclusive)
    #[arg(long)]
    day_to: Option<NaiveDate>,
}


impl FilterArgs {
    /// Build the filter specification. A half-open range is unbounded on its open side.
    pub fn to_spec(&self) -> FilterSpec {
        let mut spec = FilterSpec::new();

        if !self.managers.is_empty() {
            spec = spec.with_managers(self.managers.iter().cloned());
        }
        if !self.categories.is_empty() {
            spec = spec.with_categories(self.categories.iter().cloned());
        }
        if !self.months.is_empty() {
            spec = spec.with_months(self.months.iter().cloned());
        }

        if !self.years.is_empty() {
            spec = spec.with_years(self.years.iter().copied());
        } else if self.year_from.is_some() || self.year_to.is_some() {
            spec = spec.with_year_range(
                self.year_from.unwrap_or(i32::MIN),
                self.year_to.unwrap_or(i32::MAX),
            );
        }

        if self.sale_min.is_some() || self.sale_max.is_some() {
            spec = spec.with_sale_range(
                self.sale_min.unwrap_or(f64::NEG_INFINITY),
                self.sale_max.unwrap_or(f64::INFINITY),
            );
        }

        if self.day_from.is_some() || self.day_to.is_some() {
            spec = spec.with_day_range(
                self.day_from.unwrap_or(NaiveDate::MIN),
                self.day_to.unwrap_or(NaiveDate::MAX),
            );
        }

        spec
    }
}


#[derive(Subcommand)]
enum Commands {
    /// Show KPI tiles and sales breakdowns for the filtered rows
    Dashboard {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print summary and aggregates as JSON
        #[arg(long)]
        json: bool,

        /// Disable ANSI colours
        #[arg(long)]
        no_color: bool,
    },

    /// List the values available to each filter
    Options,

    /// Export the filtered rows to an xlsx file
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output file path, or - for stdout (default: selection.xlsx)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Export a bar chart of grouped sales as PNG or SVG
    Chart {
        #[command(flatten)]
        filters: FilterArgs,

        /// Column(s) to group by, e.g. CATEGORIA or ANO,CATEGORIA
        #[arg(long, default_value = "CATEGORIA")]
        by: GroupBy,

        /// Average sales per group instead of summing
        #[arg(long)]
        mean: bool,

        /// Export as SVG instead of PNG
        #[arg(long)]
        svg: bool,

        /// Colour theme: light or dark
        #[arg(long)]
        theme: Option<Theme>,

        /// Chart title
        #[arg(long)]
        title: Option<String>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open file after export
        #[arg(long)]
        open: bool,
    },
}


/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let Some(command) = cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    let settings = Settings::load()?;
    let load_options = cli.source.load_options(&settings);

    match command {
        Commands::Dashboard { filters, json, no_color } => {
            commands::dashboard::run(&load_options, &filters.to_spec(), json, !no_color)
        }
        Commands::Options => commands::options::run(&load_options),
        Commands::Export { filters, output } => {
            commands::export::run(&load_options, &filters.to_spec(), output.as_deref())
        }
        Commands::Chart { filters, by, mean, svg, theme, title, output, open } => {
            let theme = match theme {
                Some(theme) => theme,
                None => settings
                    .theme
                    .as_deref()
                    .map(str::parse::<Theme>)
                    .transpose()
                    .map_err(anyhow::Error::msg)?
                    .unwrap_or_default(),
            };
            let chart = commands::chart::ChartRequest {
                group_by: by,
                mean,
                svg,
                theme,
                title,
                output,
                open,
            };
            commands::chart::run(&load_options, &filters.to_spec(), &chart)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_filter_args_to_spec() {
        let cli = Cli::try_parse_from([
            "sdash", "dashboard", "--manager", "A", "--manager", "B", "--year-from", "2022", "--sale-max", "500",
        ])
        .unwrap();

        let Some(Commands::Dashboard { filters, .. }) = cli.command else {
            panic!("expected dashboard command");
        };
        let spec = filters.to_spec();

        assert_eq!(spec, FilterSpec::new()
            .with_managers(["A", "B"])
            .with_year_range(2022, i32::MAX)
            .with_sale_range(f64::NEG_INFINITY, 500.0));
    }

    #[test]
    fn test_year_set_conflicts_with_range() {
        let result = Cli::try_parse_from(["sdash", "dashboard", "--year", "2022", "--year-to", "2023"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_chart_args() {
        let cli = Cli::try_parse_from(["sdash", "chart", "--by", "ano,categoria", "--theme", "dark", "--svg"]).unwrap();
        let Some(Commands::Chart { by, theme, svg, .. }) = cli.command else {
            panic!("expected chart command");
        };

        assert_eq!(by, GroupBy::Pair(Attribute::Year, Attribute::Category));
        assert_eq!(theme, Some(Theme::Dark));
        assert!(svg);
    }

    #[test]
    fn test_unknown_group_column_rejected() {
        assert!(Cli::try_parse_from(["sdash", "chart", "--by", "REGIAO"]).is_err());
    }

    #[test]
    fn test_source_args_precedence() {
        let settings = Settings {
            sheet: Some("Vendas".to_string()),
            row_limit: Some(10),
            ..Default::default()
        };
        let source = SourceArgs {
            file: Some(PathBuf::from("dados.xlsx")),
            sheet: None,
            row_limit: Some(3),
            columns: Vec::new(),
        };

        let options = source.load_options(&settings);
        assert_eq!(options.path, PathBuf::from("dados.xlsx"));
        assert_eq!(options.sheet, "Vendas");
        assert_eq!(options.row_limit, 3);
        assert_eq!(options.columns, Attribute::ALL.to_vec());
    }

    #[test]
    fn test_columns_flag() {
        let cli = Cli::try_parse_from(["sdash", "--columns", "mes", "options"]).unwrap();
        let options = cli.source.load_options(&Settings::default());
        assert_eq!(options.columns, vec![Attribute::Month]);
    }
}
