//! Export of aggregates as SVG/PNG bar charts.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};

use super::format::{format_compact, truncate_chars};
use crate::aggregation::{Aggregate, GroupBy, Reduction};


/// Colours used for the stacked bar segments.
pub const STACK_PALETTE: [&str; 5] = ["#E694FF", "#FFA07A", "#20B2AA", "#4CAF50", "#FF6347"];

const BAR_COLOR: &str = "#4CAF50";

// Layout
const BAR_SLOT: i32 = 60;
const BAR_GAP: i32 = 16;
const PLOT_HEIGHT: i32 = 280;
const MARGIN_LEFT: i32 = 70;
const MARGIN_TOP: i32 = 60;
const MARGIN_BOTTOM: i32 = 70;
const LEGEND_WIDTH: i32 = 160;


/// Colour theme of exported charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}


impl Theme {
    fn background(&self) -> &'static str {
        match self {
            Theme::Light => "#FFFFFF",
            Theme::Dark => "#262624",
        }
    }

    fn text(&self) -> &'static str {
        match self {
            Theme::Light => "#2A3F5F",
            Theme::Dark => "#FAF9F5",
        }
    }

    fn text_secondary(&self) -> &'static str {
        match self {
            Theme::Light => "#506784",
            Theme::Dark => "#C2C0B7",
        }
    }

    fn axis(&self) -> &'static str {
        match self {
            Theme::Light => "#E5ECF6",
            Theme::Dark => "#3C3C3A",
        }
    }
}


impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}


/// Default chart title for an aggregate, e.g. "Sales by Category".
pub fn default_title(aggregate: &Aggregate) -> String {
    let prefix = match aggregate.reduction {
        Reduction::Sum => "Sales",
        Reduction::Mean => "Mean Sales",
    };
    format!("{prefix} by {}", aggregate.group_by)
}


/// Export chart as SVG.
pub fn export_chart_svg(aggregate: &Aggregate, output_path: &Path, theme: Theme, title: Option<&str>) -> Result<()> {
    let svg_content = render_chart_svg(aggregate, theme, title);

    std::fs::write(output_path, svg_content)
        .with_context(|| format!("Failed to write SVG to {}", output_path.display()))?;

    Ok(())
}


/// Export chart as PNG.
pub fn export_chart_png(aggregate: &Aggregate, output_path: &Path, theme: Theme, title: Option<&str>) -> Result<()> {
    let svg_content = render_chart_svg(aggregate, theme, title);

    // Parse SVG
    let tree = resvg::usvg::Tree::from_str(
        &svg_content,
        &resvg::usvg::Options::default(),
    ).context("Failed to parse SVG")?;

    // Render to pixmap
    let size = tree.size();
    let width = size.width() as u32;
    let height = size.height() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .context("Failed to create pixmap")?;

    let bg = hex_to_rgb(theme.background());
    pixmap.fill(tiny_skia::Color::from_rgba8(bg.0, bg.1, bg.2, 255));

    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    pixmap.save_png(output_path)
        .with_context(|| format!("Failed to save PNG to {}", output_path.display()))?;

    Ok(())
}


/// Generate SVG content for one aggregate.
///
/// Single-key aggregates become one bar per entry, in aggregate order. Pair
/// aggregates become one stacked bar per first-key value with a legend.
pub fn render_chart_svg(aggregate: &Aggregate, theme: Theme, title: Option<&str>) -> String {
    let default_title = default_title(aggregate);
    let display_title = title.unwrap_or(&default_title);

    let bars = chart_bars(aggregate);
    let stacked = matches!(aggregate.group_by, GroupBy::Pair(..));

    let num_bars = bars.len().max(1) as i32;
    let plot_width = num_bars * BAR_SLOT;
    let legend = if stacked { LEGEND_WIDTH } else { 0 };
    let width = MARGIN_LEFT + plot_width + 30 + legend;
    let height = MARGIN_TOP + PLOT_HEIGHT + MARGIN_BOTTOM;

    let max_value = bars
        .iter()
        .map(|bar| bar.segments.iter().map(|(_, v)| v.max(0.0)).sum::<f64>())
        .fold(0.0, f64::max);

    let mut svg_parts = vec![
        format!(r#"<svg width="{}" height="{}" xmlns="http://www.w3.org/2000/svg">"#, width, height),
        "<style>".to_string(),
        format!("  .title {{ fill: {}; font: bold 16px sans-serif; }}", theme.text()),
        format!("  .axis-label {{ fill: {}; font: 11px sans-serif; }}", theme.text_secondary()),
        format!("  .value-label {{ fill: {}; font: 10px sans-serif; }}", theme.text()),
        "</style>".to_string(),
        format!(r#"<rect width="{}" height="{}" fill="{}"/>"#, width, height, theme.background()),
        format!(r#"<text x="{}" y="30" class="title">{}</text>"#, MARGIN_LEFT, escape_xml(display_title)),
    ];

    // Baseline
    let baseline = MARGIN_TOP + PLOT_HEIGHT;
    svg_parts.push(format!(
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="1"/>"#,
        MARGIN_LEFT, baseline, MARGIN_LEFT + plot_width, baseline, theme.axis()
    ));

    if bars.is_empty() {
        svg_parts.push(format!(
            r#"<text x="{}" y="{}" class="axis-label">No data for the current filters</text>"#,
            MARGIN_LEFT + 10, MARGIN_TOP + PLOT_HEIGHT / 2
        ));
    }

    for (index, bar) in bars.iter().enumerate() {
        let x = MARGIN_LEFT + index as i32 * BAR_SLOT + BAR_GAP / 2;
        let bar_width = BAR_SLOT - BAR_GAP;
        let mut top = baseline;

        for (series_index, value) in &bar.segments {
            let h = scaled_height(*value, max_value);
            top -= h;
            let color = match series_index {
                Some(i) => STACK_PALETTE[i % STACK_PALETTE.len()],
                None => BAR_COLOR,
            };
            svg_parts.push(format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"><title>{}</title></rect>"#,
                x, top, bar_width, h, color, escape_xml(&format_compact(*value))
            ));
        }

        let total: f64 = bar.segments.iter().map(|(_, v)| v).sum();
        svg_parts.push(format!(
            r#"<text x="{}" y="{}" class="value-label" text-anchor="middle">{}</text>"#,
            x + bar_width / 2, top - 4, escape_xml(&format_compact(total))
        ));
        svg_parts.push(format!(
            r#"<text x="{}" y="{}" class="axis-label" text-anchor="middle">{}</text>"#,
            x + bar_width / 2, baseline + 18, escape_xml(&truncate_chars(&bar.label, 10))
        ));
    }

    // Legend
    if stacked {
        let legend_x = MARGIN_LEFT + plot_width + 30;
        for (index, name) in aggregate.stacks().series.iter().enumerate() {
            let y = MARGIN_TOP + index as i32 * 20;
            svg_parts.push(format!(
                r#"<rect x="{}" y="{}" width="12" height="12" fill="{}"/>"#,
                legend_x, y, STACK_PALETTE[index % STACK_PALETTE.len()]
            ));
            svg_parts.push(format!(
                r#"<text x="{}" y="{}" class="axis-label">{}</text>"#,
                legend_x + 18, y + 10, escape_xml(&truncate_chars(&name.to_string(), 18))
            ));
        }
    }

    svg_parts.push("</svg>".to_string());

    svg_parts.join("\n")
}


/// One bar of the chart. Segment series index is `None` for plain bars.
struct ChartBar {
    label: String,
    segments: Vec<(Option<usize>, f64)>,
}


fn chart_bars(aggregate: &Aggregate) -> Vec<ChartBar> {
    match aggregate.group_by {
        GroupBy::Single(_) => aggregate
            .entries
            .iter()
            .map(|entry| ChartBar {
                label: entry.key.to_string(),
                segments: vec![(None, entry.value)],
            })
            .collect(),
        GroupBy::Pair(..) => aggregate
            .stacks()
            .stacks
            .into_iter()
            .map(|stack| ChartBar {
                label: stack.key.to_string(),
                segments: stack.segments.into_iter().map(|(i, v)| (Some(i), v)).collect(),
            })
            .collect(),
    }
}


fn scaled_height(value: f64, max_value: f64) -> i32 {
    if max_value <= 0.0 || value <= 0.0 {
        return 0;
    }
    ((value / max_value) * PLOT_HEIGHT as f64).round() as i32
}


/// Escape text for use inside SVG elements.
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}


/// Open file with default application.
pub fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()
            .context("Failed to open file")?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.to_string_lossy()])
            .spawn()
            .context("Failed to open file")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()
            .context("Failed to open file")?;
    }

    Ok(())
}


/// Convert hex color to RGB tuple.
fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
    (r, g, b)
}
