//! Dashboard rendering using terminal output.

use serde::Serialize;

use super::format::{format_count, format_currency, truncate_chars};
use crate::aggregation::{
    aggregate, summarize, Aggregate, FilterSpec, GroupBy, Reduction, Stack, Summary,
};
use crate::config::BAR_WIDTH;
use crate::error::DashboardError;
use crate::models::{Attribute, Dataset};


// Constants
const GREEN: &str = "\x1b[38;5;71m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Terminal approximations of the stacked chart palette.
const STACK_COLORS: [&str; 5] = [
    "\x1b[38;5;177m",
    "\x1b[38;5;216m",
    "\x1b[38;5;37m",
    "\x1b[38;5;71m",
    "\x1b[38;5;203m",
];
const STACK_GLYPHS: [char; 5] = ['█', '▓', '▒', '■', '▪'];

const LABEL_WIDTH: usize = 20;
const INNER_WIDTH: usize = 78;
const TILE_WIDTH: usize = 26;


/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub filters: String,
    pub summary: Summary,
    pub by_category: Aggregate,
    pub by_year: Aggregate,
    pub by_manager: Aggregate,
    pub by_month: Option<Aggregate>,
    pub by_year_and_category: Aggregate,
}


impl DashboardView {
    /// Compute the view for an already filtered selection.
    pub fn build(selection: &Dataset, spec: &FilterSpec) -> Result<Self, DashboardError> {
        let sum_by = |group_by| aggregate(selection, group_by, Reduction::Sum);

        let by_month = if selection.schema().contains(Attribute::Month) {
            Some(sum_by(GroupBy::Single(Attribute::Month))?)
        } else {
            None
        };

        Ok(Self {
            filters: spec.to_string(),
            summary: summarize(selection),
            by_category: sum_by(GroupBy::Single(Attribute::Category))?,
            by_year: sum_by(GroupBy::Single(Attribute::Year))?,
            by_manager: sum_by(GroupBy::Single(Attribute::Manager))?,
            by_month,
            by_year_and_category: sum_by(GroupBy::Pair(Attribute::Year, Attribute::Category))?,
        })
    }
}


fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("{code}{text}{RESET}")
    } else {
        text.to_string()
    }
}


/// Create a simple text bar for visualization.
fn create_bar(value: f64, max_value: f64, width: usize, code: &str, color: bool) -> String {
    if max_value <= 0.0 {
        return paint(&"░".repeat(width), DIM, color);
    }

    let filled = ((value / max_value) * width as f64) as usize;
    let filled = filled.min(width);

    paint(&"█".repeat(filled), code, color) + &paint(&"░".repeat(width - filled), DIM, color)
}


/// Render the complete dashboard.
pub fn render_dashboard(view: &DashboardView, color: bool) -> String {
    let mut out = String::new();

    render_kpi_section(&mut out, &view.summary, color);
    out.push('\n');

    render_bar_chart(&mut out, "Sales by Category", &view.by_category, color);
    out.push('\n');
    render_bar_chart(&mut out, "Sales by Year", &view.by_year, color);
    out.push('\n');
    render_stacked_chart(&mut out, "Sales by Category and Year", &view.by_year_and_category, color);
    out.push('\n');
    render_bar_chart(&mut out, "Sales by Manager", &view.by_manager, color);
    out.push('\n');

    if let Some(by_month) = &view.by_month {
        render_bar_chart(&mut out, "Sales by Month", by_month, color);
        out.push('\n');
    }

    render_footer(&mut out, &view.filters, color);

    out
}


/// Render the KPI tiles section.
fn render_kpi_section(out: &mut String, summary: &Summary, color: bool) {
    let border = "─".repeat(TILE_WIDTH);

    // Top borders
    out.push_str(&format!("┌{border}┐  ┌{border}┐  ┌{border}┐\n"));

    // Titles
    out.push_str(&format!(
        "│{:^26}│  │{:^26}│  │{:^26}│\n",
        "Total Sales", "Mean Sales", "Rows"
    ));

    // Values
    let values = [
        format_currency(summary.total),
        format_currency(summary.mean),
        format_count(summary.rows),
    ];
    let cells: Vec<String> = values
        .iter()
        .map(|v| paint(&format!("{v:^26}"), &format!("{BOLD}{GREEN}"), color))
        .collect();
    out.push_str(&format!("│{}│  │{}│  │{}│\n", cells[0], cells[1], cells[2]));

    // Bottom borders
    out.push_str(&format!("└{border}┘  └{border}┘  └{border}┘\n"));
}


fn render_header(out: &mut String, title: &str, color: bool) {
    let border = "─".repeat(INNER_WIDTH);
    out.push_str(&format!("┌{border}┐\n"));
    out.push_str(&format!("│ {} │\n", paint(&format!("{title:<76}"), BOLD, color)));
    out.push_str(&format!("├{border}┤\n"));
}


fn render_empty(out: &mut String, color: bool) {
    out.push_str(&format!(
        "│ {} │\n",
        paint(&format!("{:<76}", "No data for the current filters"), DIM, color)
    ));
    out.push_str(&format!("└{}┘\n", "─".repeat(INNER_WIDTH)));
}


/// Render one single-key aggregate as horizontal bars, in aggregate order.
fn render_bar_chart(out: &mut String, title: &str, aggregate: &Aggregate, color: bool) {
    render_header(out, title, color);

    if aggregate.is_empty() {
        render_empty(out, color);
        return;
    }

    let total = aggregate.total();
    let max_value = aggregate.max_value();

    for entry in &aggregate.entries {
        let label = truncate_chars(&entry.key.to_string(), LABEL_WIDTH);
        let bar = create_bar(entry.value, max_value, BAR_WIDTH, GREEN, color);
        let percentage = if total > 0.0 { entry.value / total * 100.0 } else { 0.0 };

        out.push_str(&format!(
            "│ {:<20} {} {} {} │\n",
            label,
            bar,
            paint(&format!("{:>16}", format_currency(entry.value)), GREEN, color),
            paint(&format!("{percentage:>6.1}%"), CYAN, color),
        ));
    }

    out.push_str(&format!("└{}┘\n", "─".repeat(INNER_WIDTH)));
}


/// Render a pair aggregate as one stacked bar per first-key value.
fn render_stacked_chart(out: &mut String, title: &str, aggregate: &Aggregate, color: bool) {
    render_header(out, title, color);

    if aggregate.is_empty() {
        render_empty(out, color);
        return;
    }

    let layout = aggregate.stacks();
    let max_total = layout.max_total();
    let grand_total: f64 = layout.stacks.iter().map(Stack::total).sum();

    for stack in &layout.stacks {
        let stack_total = stack.total();
        let bar = create_stacked_bar(&stack.segments, max_total, BAR_WIDTH, color);
        let percentage = if grand_total > 0.0 { stack_total / grand_total * 100.0 } else { 0.0 };

        out.push_str(&format!(
            "│ {:<20} {} {} {} │\n",
            truncate_chars(&stack.key.to_string(), LABEL_WIDTH),
            bar,
            paint(&format!("{:>16}", format_currency(stack_total)), GREEN, color),
            paint(&format!("{percentage:>6.1}%"), CYAN, color),
        ));
    }

    // Legend
    out.push_str(&format!("├{}┤\n", "─".repeat(INNER_WIDTH)));
    for (index, name) in layout.series.iter().enumerate() {
        let glyph = STACK_GLYPHS[index % STACK_GLYPHS.len()].to_string();
        out.push_str(&format!(
            "│   {} {:<72} │\n",
            paint(&glyph, STACK_COLORS[index % STACK_COLORS.len()], color),
            truncate_chars(&name.to_string(), 72),
        ));
    }

    out.push_str(&format!("└{}┘\n", "─".repeat(INNER_WIDTH)));
}


/// Build a bar whose segments are proportional to each series value.
fn create_stacked_bar(segments: &[(usize, f64)], max_total: f64, width: usize, color: bool) -> String {
    if max_total <= 0.0 {
        return paint(&"░".repeat(width), DIM, color);
    }

    let mut bar = String::new();
    let mut cumulative = 0.0;
    let mut drawn = 0;

    for (series_index, value) in segments {
        cumulative += value;
        let end = ((cumulative / max_total) * width as f64).round() as usize;
        let end = end.min(width);
        let length = end.saturating_sub(drawn);
        drawn = drawn.max(end);

        let glyph = STACK_GLYPHS[series_index % STACK_GLYPHS.len()].to_string();
        bar += &paint(&glyph.repeat(length), STACK_COLORS[series_index % STACK_COLORS.len()], color);
    }

    bar + &paint(&"░".repeat(width - drawn), DIM, color)
}


/// Render the footer with the active filters.
fn render_footer(out: &mut String, filters: &str, color: bool) {
    out.push_str(&format!("{}{}\n", paint("Filters: ", DIM, color), paint(filters, CYAN, color)));
    out.push_str(&format!(
        "{}{}\n",
        paint("Tip: export the selection with ", DIM, color),
        paint("sdash export -o selection.xlsx", CYAN, color)
    ));
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::filter;
    use crate::models::{SaleRecord, Schema};

    fn dataset() -> Dataset {
        Dataset::new(
            Schema::required(),
            vec![
                SaleRecord::new("A", 2022, "CALÇA", 100.0),
                SaleRecord::new("B", 2023, "TÊNIS", 50.0),
                SaleRecord::new("A", 2023, "CALÇA", 25.0),
            ],
        )
    }

    #[test]
    fn test_build_view() {
        let view = DashboardView::build(&dataset(), &FilterSpec::new()).unwrap();

        assert_eq!(view.summary.rows, 3);
        assert_eq!(view.summary.total, 175.0);
        assert_eq!(view.by_category.entries.len(), 2);
        assert_eq!(view.by_year_and_category.entries.len(), 3);
        assert!(view.by_month.is_none());
    }

    #[test]
    fn test_render_contains_sections() {
        let view = DashboardView::build(&dataset(), &FilterSpec::new()).unwrap();
        let text = render_dashboard(&view, false);

        assert!(text.contains("Total Sales"));
        assert!(text.contains("R$ 175"));
        assert!(text.contains("R$ 58"));
        assert!(text.contains("Sales by Category and Year"));
        assert!(text.contains("Sales by Manager"));
        assert!(!text.contains("Sales by Month"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_chart_rows_fill_the_box() {
        let view = DashboardView::build(&dataset(), &FilterSpec::new()).unwrap();
        let text = render_dashboard(&view, false);

        assert!(text.ends_with('\n'));
        let chart_lines: Vec<&str> = text
            .lines()
            .filter(|line| line.starts_with(['┌', '│', '├', '└']))
            .filter(|line| !["┐  ┌", "│  │", "┘  └"].iter().any(|tile| line.contains(tile)))
            .collect();
        assert!(!chart_lines.is_empty());
        for line in chart_lines {
            assert_eq!(line.chars().count(), INNER_WIDTH + 2, "{line}");
        }
    }

    #[test]
    fn test_bar_order_follows_aggregate() {
        let view = DashboardView::build(&dataset(), &FilterSpec::new()).unwrap();
        let text = render_dashboard(&view, false);

        let tenis = text.find("│ TÊNIS").unwrap();
        let calca = text.find("│ CALÇA").unwrap();
        assert!(tenis < calca);
    }

    #[test]
    fn test_render_empty_selection() {
        let spec = FilterSpec::new().with_managers(["Z"]);
        let selection = filter(&dataset(), &spec).unwrap();
        let view = DashboardView::build(&selection, &spec).unwrap();
        let text = render_dashboard(&view, true);

        assert!(text.contains("R$ 0"));
        assert!(text.contains("No data for the current filters"));
        assert!(text.contains("GERENTE in [Z]"));
    }

    #[test]
    fn test_bar_widths() {
        assert_eq!(create_bar(5.0, 10.0, 10, GREEN, false), "█████░░░░░");
        assert_eq!(create_bar(1.0, 0.0, 4, GREEN, false), "░░░░");
        assert_eq!(
            create_stacked_bar(&[(0, 2.0), (1, 2.0)], 8.0, 8, false),
            "██▓▓░░░░"
        );
    }
}
