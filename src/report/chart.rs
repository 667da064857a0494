//! Chart rendering.
//!
//! Every chart is built from a count table and owns its data, so each render
//! is independent of any other. Charts render either as Unicode text for the
//! terminal and Markdown, or as an inline SVG element for the HTML page.

use super::html::escape;
use crate::analysis::scale::{greens, series_color, ColorScale};
use crate::models::{CountAggregation, CountEntry, CrossAggregation};
use std::f64::consts::PI;

const NO_DATA: &str = "(no data)";
const DEFAULT_BAR_COLOR: &str = "#02C028";
const SERIES_GLYPHS: [char; 4] = ['█', '▓', '▒', '░'];

// SVG layout, in user units.
const SVG_WIDTH: f64 = 640.0;
const PADDING: f64 = 12.0;
const LABEL_WIDTH: f64 = 210.0;
const VALUE_WIDTH: f64 = 90.0;
const ROW_HEIGHT: f64 = 26.0;
const BAR_HEIGHT: f64 = 18.0;
const LEGEND_HEIGHT: f64 = 26.0;

/// Length of a text bar for `count` out of `max` in `width` cells.
///
/// Non-zero counts always get at least one cell.
fn bar_len(count: usize, max: usize, width: usize) -> usize {
    if max == 0 || count == 0 {
        return 0;
    }
    let len = (count as f64 / max as f64 * width as f64).round() as usize;
    len.clamp(1, width.max(1))
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}

fn svg_open(height: f64, title: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
         viewBox=\"0 0 {w} {h}\" role=\"img\" aria-label=\"{t}\" class=\"chart\">\
         <title>{t}</title>",
        w = SVG_WIDTH,
        h = height,
        t = escape(title)
    )
}

fn svg_no_data(title: &str) -> String {
    let height = 60.0;
    let mut svg = svg_open(height, title);
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" class=\"no-data\">no data</text>",
        SVG_WIDTH / 2.0,
        height / 2.0 + 5.0
    ));
    svg.push_str("</svg>");
    svg
}

fn svg_row_label(svg: &mut String, y: f64, label: &str) {
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" class=\"label\">{}</text>",
        LABEL_WIDTH - 6.0,
        y + BAR_HEIGHT / 2.0 + 4.0,
        escape(label)
    ));
}

/// Horizontal bar chart of one count table.
#[derive(Debug, Clone)]
pub struct BarChart {
    title: String,
    entries: Vec<CountEntry>,
    color: String,
    scale: Option<ColorScale>,
}

impl BarChart {
    /// Bars in descending count order.
    pub fn new(title: impl Into<String>, counts: &CountAggregation) -> Self {
        Self {
            title: title.into(),
            entries: counts.sorted_desc(),
            color: DEFAULT_BAR_COLOR.to_string(),
            scale: None,
        }
    }

    /// Fill every bar with one color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Color each bar by its count instead of a single color.
    pub fn with_scale(mut self, scale: ColorScale) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn max(&self) -> usize {
        self.entries.iter().map(|e| e.count).max().unwrap_or(0)
    }

    pub fn render_text(&self, width: usize) -> String {
        if self.is_empty() {
            return format!("{}\n", NO_DATA);
        }

        let max = self.max();
        let pad = label_width(self.entries.iter().map(|e| e.value.as_str()));
        let mut out = String::new();

        for entry in &self.entries {
            let glyph = self.scale.map(|s| s.shade(entry.count)).unwrap_or('█');
            let bar: String = std::iter::repeat(glyph)
                .take(bar_len(entry.count, max, width))
                .collect();
            out.push_str(&format!(
                "{:<pad$} │{} {}\n",
                entry.value,
                bar,
                entry.count,
                pad = pad
            ));
        }

        if let Some(scale) = self.scale {
            out.push_str(&format!(
                "{:<pad$}  ░ {} … █ {}\n",
                "scale",
                scale.min,
                scale.max,
                pad = pad
            ));
        }

        out
    }

    pub fn render_svg(&self) -> String {
        if self.is_empty() {
            return svg_no_data(&self.title);
        }

        let max = self.max().max(1);
        let plot_width = SVG_WIDTH - LABEL_WIDTH - VALUE_WIDTH;
        let legend = if self.scale.is_some() { LEGEND_HEIGHT } else { 0.0 };
        let height = PADDING * 2.0 + ROW_HEIGHT * self.entries.len() as f64 + legend;
        let mut svg = svg_open(height, &self.title);

        for (i, entry) in self.entries.iter().enumerate() {
            let y = PADDING + ROW_HEIGHT * i as f64;
            let w = plot_width * entry.count as f64 / max as f64;
            let fill = match self.scale {
                Some(scale) => scale.color(entry.count).to_string(),
                None => self.color.clone(),
            };

            svg_row_label(&mut svg, y, &entry.value);
            svg.push_str(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>",
                LABEL_WIDTH, y, w, BAR_HEIGHT, fill
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" class=\"value\">{}</text>",
                LABEL_WIDTH + w + 6.0,
                y + BAR_HEIGHT / 2.0 + 4.0,
                entry.count
            ));
        }

        if let Some(scale) = self.scale {
            let y = height - PADDING - 12.0;
            let steps = 10;
            let step_w = 14.0;
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" class=\"value\">{}</text>",
                LABEL_WIDTH - 6.0,
                y + 10.0,
                scale.min
            ));
            for k in 0..steps {
                let t = k as f64 / (steps - 1) as f64;
                svg.push_str(&format!(
                    "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"12\" fill=\"{}\"/>",
                    LABEL_WIDTH + step_w * k as f64,
                    y,
                    step_w,
                    greens(t)
                ));
            }
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" class=\"value\">{}</text>",
                LABEL_WIDTH + step_w * steps as f64 + 6.0,
                y + 10.0,
                scale.max
            ));
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Horizontal stacked bars: one bar per row key, one segment per column key.
#[derive(Debug, Clone)]
pub struct StackedBarChart {
    title: String,
    table: CrossAggregation,
    palette: Vec<String>,
}

impl StackedBarChart {
    pub fn new(title: impl Into<String>, table: &CrossAggregation, palette: &[String]) -> Self {
        Self {
            title: title.into(),
            table: table.clone(),
            palette: palette.to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn max_total(&self) -> usize {
        self.table
            .cells
            .iter()
            .map(|row| row.iter().sum::<usize>())
            .max()
            .unwrap_or(0)
    }

    fn glyph(index: usize) -> char {
        SERIES_GLYPHS[index % SERIES_GLYPHS.len()]
    }

    pub fn render_text(&self, width: usize) -> String {
        if self.is_empty() {
            return format!("{}\n", NO_DATA);
        }

        let max = self.max_total();
        let pad = label_width(self.table.rows.iter().map(String::as_str));
        let mut out = String::new();

        let legend: Vec<String> = self
            .table
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} {}", Self::glyph(i), c))
            .collect();
        out.push_str(&format!("{:<pad$}  {}\n", "", legend.join("  "), pad = pad));

        for (row, cells) in self.table.rows.iter().zip(&self.table.cells) {
            // Cumulative rounding keeps the stacked bar as long as the total
            let mut bar = String::new();
            let mut running = 0;
            for (i, &count) in cells.iter().enumerate() {
                let start = bar_len(running, max, width);
                running += count;
                let end = bar_len(running, max, width);
                bar.extend(std::iter::repeat(Self::glyph(i)).take(end.saturating_sub(start)));
            }

            let values: Vec<String> = self
                .table
                .columns
                .iter()
                .zip(cells)
                .map(|(c, v)| format!("{}: {}", c, v))
                .collect();

            out.push_str(&format!(
                "{:<pad$} │{} {} ({})\n",
                row,
                bar,
                running,
                values.join(", "),
                pad = pad
            ));
        }

        out
    }

    pub fn render_svg(&self) -> String {
        if self.is_empty() {
            return svg_no_data(&self.title);
        }

        let max = self.max_total().max(1);
        let plot_width = SVG_WIDTH - LABEL_WIDTH - VALUE_WIDTH;
        let height = PADDING * 2.0 + LEGEND_HEIGHT + ROW_HEIGHT * self.table.rows.len() as f64;
        let mut svg = svg_open(height, &self.title);

        // Legend
        let mut x = LABEL_WIDTH;
        for (i, column) in self.table.columns.iter().enumerate() {
            svg.push_str(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{}\"/>",
                x,
                PADDING,
                series_color(&self.palette, i)
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" class=\"label\">{}</text>",
                x + 16.0,
                PADDING + 10.0,
                escape(column)
            ));
            x += 24.0 + 7.5 * column.chars().count() as f64;
        }

        for (r, (row, cells)) in self.table.rows.iter().zip(&self.table.cells).enumerate() {
            let y = PADDING + LEGEND_HEIGHT + ROW_HEIGHT * r as f64;
            svg_row_label(&mut svg, y, row);

            let mut x = LABEL_WIDTH;
            for (i, &count) in cells.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let w = plot_width * count as f64 / max as f64;
                svg.push_str(&format!(
                    "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>",
                    x,
                    y,
                    w,
                    BAR_HEIGHT,
                    series_color(&self.palette, i)
                ));
                svg.push_str(&format!(
                    "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" class=\"segment\">{}</text>",
                    x + w / 2.0,
                    y + BAR_HEIGHT / 2.0 + 4.0,
                    count
                ));
                x += w;
            }

            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" class=\"value\">{}</text>",
                x + 6.0,
                y + BAR_HEIGHT / 2.0 + 4.0,
                cells.iter().sum::<usize>()
            ));
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Ring chart of one count table. Slices are labelled `label: value`.
#[derive(Debug, Clone)]
pub struct DonutChart {
    title: String,
    entries: Vec<CountEntry>,
    palette: Vec<String>,
    /// Inner radius as a fraction of the outer radius.
    hole: f64,
}

impl DonutChart {
    pub fn new(title: impl Into<String>, counts: &CountAggregation, palette: &[String]) -> Self {
        Self {
            title: title.into(),
            entries: counts.sorted_desc(),
            palette: palette.to_vec(),
            hole: 0.4,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn render_text(&self, width: usize) -> String {
        if self.is_empty() {
            return format!("{}\n", NO_DATA);
        }

        let total = self.total();
        let labels: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{}: {}", e.value, e.count))
            .collect();
        let pad = label_width(labels.iter().map(String::as_str));
        let mut out = String::new();

        for (entry, label) in self.entries.iter().zip(&labels) {
            let share = entry.count as f64 / total as f64;
            let bar: String = std::iter::repeat('█')
                .take(bar_len(entry.count, total, width))
                .collect();
            out.push_str(&format!(
                "{:<pad$} │{} {:.1}%\n",
                label,
                bar,
                share * 100.0,
                pad = pad
            ));
        }

        out
    }

    pub fn render_svg(&self) -> String {
        if self.is_empty() {
            return svg_no_data(&self.title);
        }

        let total = self.total() as f64;
        let radius = 90.0;
        let inner = radius * self.hole;
        let cx = PADDING + radius;
        let cy = PADDING + radius;
        let legend_rows = self.entries.len() as f64 * 20.0;
        let height = (PADDING * 2.0 + radius * 2.0).max(PADDING * 2.0 + legend_rows);
        let mut svg = svg_open(height, &self.title);

        let mut angle = -PI / 2.0;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.count == 0 {
                continue;
            }
            let color = series_color(&self.palette, i);
            let share = entry.count as f64 / total;

            if share >= 1.0 - 1e-9 {
                // A full ring cannot be drawn as a single arc
                svg.push_str(&format!(
                    "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.1}\"/>",
                    cx,
                    cy,
                    (radius + inner) / 2.0,
                    color,
                    radius - inner
                ));
            } else {
                let end = angle + share * 2.0 * PI;
                let large = if share > 0.5 { 1 } else { 0 };
                let point = |r: f64, a: f64| (cx + r * a.cos(), cy + r * a.sin());
                let (ox1, oy1) = point(radius, angle);
                let (ox2, oy2) = point(radius, end);
                let (ix1, iy1) = point(inner, angle);
                let (ix2, iy2) = point(inner, end);
                svg.push_str(&format!(
                    "<path d=\"M {:.2} {:.2} A {r:.1} {r:.1} 0 {l} 1 {:.2} {:.2} \
                     L {:.2} {:.2} A {ri:.1} {ri:.1} 0 {l} 0 {:.2} {:.2} Z\" fill=\"{}\"/>",
                    ox1,
                    oy1,
                    ox2,
                    oy2,
                    ix2,
                    iy2,
                    ix1,
                    iy1,
                    color,
                    r = radius,
                    ri = inner,
                    l = large
                ));
                angle = end;
            }
        }

        // Legend
        let lx = PADDING * 3.0 + radius * 2.0;
        for (i, entry) in self.entries.iter().enumerate() {
            let y = PADDING + 20.0 * i as f64;
            svg.push_str(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{}\"/>",
                lx,
                y,
                series_color(&self.palette, i)
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" class=\"label\">{}: {} ({:.1}%)</text>",
                lx + 18.0,
                y + 10.0,
                escape(&entry.value),
                entry.count,
                entry.count as f64 / total * 100.0
            ));
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Any of the dashboard chart kinds.
#[derive(Debug, Clone)]
pub enum Chart {
    Bar(BarChart),
    Stacked(StackedBarChart),
    Donut(DonutChart),
}

impl Chart {
    pub fn render_text(&self, width: usize) -> String {
        match self {
            Chart::Bar(c) => c.render_text(width),
            Chart::Stacked(c) => c.render_text(width),
            Chart::Donut(c) => c.render_text(width),
        }
    }

    pub fn render_svg(&self) -> String {
        match self {
            Chart::Bar(c) => c.render_svg(),
            Chart::Stacked(c) => c.render_svg(),
            Chart::Donut(c) => c.render_svg(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;

    fn counts(pairs: &[(&str, usize)]) -> CountAggregation {
        CountAggregation {
            column: Some(Column::Party),
            entries: pairs
                .iter()
                .map(|(v, c)| CountEntry {
                    value: v.to_string(),
                    count: *c,
                })
                .collect(),
        }
    }

    fn palette() -> Vec<String> {
        vec!["#02C028".to_string(), "#026014".to_string()]
    }

    #[test]
    fn test_bar_len() {
        assert_eq!(bar_len(10, 10, 40), 40);
        assert_eq!(bar_len(5, 10, 40), 20);
        assert_eq!(bar_len(1, 1000, 40), 1);
        assert_eq!(bar_len(0, 10, 40), 0);
        assert_eq!(bar_len(3, 0, 40), 0);
    }

    #[test]
    fn test_bar_chart_text_sorted() {
        let chart = BarChart::new("Parties", &counts(&[("PT", 2), ("PL", 4)]));
        let text = chart.render_text(8);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "PL │████████ 4");
        assert_eq!(lines[1], "PT │████ 2");
    }

    #[test]
    fn test_bar_chart_scaled_text() {
        let data = counts(&[("PT", 1), ("PL", 5)]);
        let chart = BarChart::new("Parties", &data).with_scale(ColorScale::from_counts(&data));
        let text = chart.render_text(4);
        assert!(text.contains("PL │████ 5"));
        assert!(text.contains("PT │░ 1"));
        assert!(text.contains("░ 1 … █ 5"));
    }

    #[test]
    fn test_bar_chart_svg() {
        let data = counts(&[("PT", 2), ("P<S>B", 1)]);
        let svg = BarChart::new("Parties", &data).with_color("#123456").render_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("fill=\"#123456\"").count(), 2);
        assert!(svg.contains("P&lt;S&gt;B"));
    }

    #[test]
    fn test_empty_charts_render_no_data() {
        let empty = CountAggregation::default();
        assert_eq!(BarChart::new("x", &empty).render_text(10), "(no data)\n");
        assert!(BarChart::new("x", &empty).render_svg().contains("no data"));
        assert_eq!(DonutChart::new("x", &empty, &palette()).render_text(10), "(no data)\n");
        assert!(DonutChart::new("x", &empty, &palette()).render_svg().contains("no data"));

        let cross = CrossAggregation::new(Column::Party, Column::Gender);
        let stacked = StackedBarChart::new("x", &cross, &palette());
        assert_eq!(stacked.render_text(10), "(no data)\n");
        assert!(stacked.render_svg().contains("no data"));
    }

    #[test]
    fn test_stacked_text_shows_segment_values() {
        let mut cross = CrossAggregation::new(Column::Party, Column::Gender);
        cross.rows = vec!["PT".to_string(), "PL".to_string()];
        cross.columns = vec!["FEMININO".to_string(), "MASCULINO".to_string()];
        cross.cells = vec![vec![1, 3], vec![0, 2]];

        let text = StackedBarChart::new("Parties", &cross, &palette()).render_text(8);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "    █ FEMININO  ▓ MASCULINO");
        assert_eq!(lines[1], "PT │██▓▓▓▓▓▓ 4 (FEMININO: 1, MASCULINO: 3)");
        assert_eq!(lines[2], "PL │▓▓▓▓ 2 (FEMININO: 0, MASCULINO: 2)");
    }

    #[test]
    fn test_stacked_svg_segments() {
        let mut cross = CrossAggregation::new(Column::Party, Column::Gender);
        cross.rows = vec!["PT".to_string()];
        cross.columns = vec!["FEMININO".to_string(), "MASCULINO".to_string()];
        cross.cells = vec![vec![0, 2]];

        let svg = StackedBarChart::new("Parties", &cross, &palette()).render_svg();
        // Two legend swatches plus one non-empty segment
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains("class=\"segment\">2</text>"));
    }

    #[test]
    fn test_donut_labels() {
        let data = counts(&[("PARDA", 1), ("BRANCA", 3)]);
        let chart = DonutChart::new("Race", &data, &palette());

        let text = chart.render_text(4);
        assert!(text.contains("BRANCA: 3 │███ 75.0%"));
        assert!(text.contains("PARDA: 1  │█ 25.0%"));

        let svg = chart.render_svg();
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("BRANCA: 3 (75.0%)"));
    }

    #[test]
    fn test_donut_single_slice_is_full_ring() {
        let data = counts(&[("FEMININO", 5)]);
        let svg = DonutChart::new("Gender", &data, &palette()).render_svg();
        assert!(svg.contains("<circle"));
        assert!(!svg.contains("<path"));
    }
}
