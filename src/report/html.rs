//! Self-contained HTML dashboard.
//!
//! One page with inline CSS and one inline SVG per chart. No scripts and no
//! external assets, so the file can be opened offline or attached anywhere.

use super::generator::{dashboard_sections, ViewSection, ViewTable};
use crate::config::ReportConfig;
use crate::models::{CandidateRecord, Column, CountAggregation, CrossAggregation, DashboardReport};

const STYLE: &str = "\
body{font-family:system-ui,-apple-system,sans-serif;margin:0;background:#f6f8f6;color:#1b2a1f}\
header{background:#026014;color:#fff;padding:20px 32px}\
header h1{margin:0 0 6px;font-size:24px}\
header .meta{font-size:13px;opacity:.85}\
main{max-width:980px;margin:0 auto;padding:16px 32px 40px}\
section{background:#fff;border:1px solid #dde5de;border-radius:8px;padding:16px 20px;margin:16px 0}\
h2{font-size:18px;margin:0 0 4px}\
p.desc{margin:0 0 12px;color:#5b6b5f;font-size:13px}\
table{border-collapse:collapse;font-size:13px;margin:8px 0}\
th,td{border-bottom:1px solid #e6ece7;padding:4px 10px;text-align:left}\
td.num,th.num{text-align:right}\
tr.total td{font-weight:600}\
.scroll{overflow-x:auto}\
svg.chart{max-width:100%;height:auto}\
svg .label,svg .value{font-size:12px;fill:#1b2a1f}\
svg .segment{font-size:11px;fill:#fff}\
svg .no-data{font-size:14px;fill:#8a968c}\
footer{text-align:center;font-size:12px;color:#8a968c;padding:16px}";

/// HTML-escape text content and attribute values.
pub fn escape<S: AsRef<str>>(s: S) -> String {
    let mut out = String::with_capacity(s.as_ref().len() + 8);
    for ch in s.as_ref().chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// Append-only page buffer.
struct Html {
    buf: String,
}

impl Html {
    fn new() -> Self {
        Self {
            buf: String::with_capacity(64 * 1024),
        }
    }

    fn push<S: AsRef<str>>(&mut self, s: S) {
        self.buf.push_str(s.as_ref());
    }

    fn finish(self) -> String {
        self.buf
    }
}

/// Render the whole dashboard as one HTML document.
pub fn generate_html_report(report: &DashboardReport, config: &ReportConfig) -> String {
    let mut w = Html::new();
    let meta = &report.metadata;

    w.push("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    w.push("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
    w.push("<title>");
    w.push(escape(&meta.title));
    w.push("</title><style>");
    w.push(STYLE);
    w.push("</style></head><body>");

    w.push("<header><h1>");
    w.push(escape(&meta.title));
    w.push("</h1><div class=\"meta\">");
    w.push(format!(
        "{}: <strong>{}</strong> · {}: <strong>{}</strong> · {} of {} candidates · {}",
        Column::Unit.label(),
        escape(&report.selection.unit),
        Column::Office.label(),
        escape(&report.selection.office),
        meta.filtered_records,
        meta.total_records,
        meta.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    w.push("</div></header><main>");

    write_preview(&mut w, report);
    for section in dashboard_sections(&report.views, config) {
        write_view_section(&mut w, &section);
    }

    w.push("</main><footer>Source: ");
    w.push(escape(&meta.input));
    w.push(format!(" · candidash v{}", env!("CARGO_PKG_VERSION")));
    w.push("</footer></body></html>\n");

    w.finish()
}

fn write_preview(w: &mut Html, report: &DashboardReport) {
    w.push("<section id=\"data-preview\"><h2>Data Preview</h2>");

    if report.preview.is_empty() {
        w.push("<p class=\"desc\">No candidates match the current selection.</p></section>");
        return;
    }

    w.push(format!(
        "<p class=\"desc\">First {} of {} matching rows.</p>",
        report.preview.len(),
        report.metadata.filtered_records
    ));
    w.push("<div class=\"scroll\"><table><thead><tr>");
    for (_, header) in &report.headers {
        w.push("<th>");
        w.push(escape(header));
        w.push("</th>");
    }
    w.push("</tr></thead><tbody>");
    for record in &report.preview {
        write_preview_row(w, &report.headers, record);
    }
    w.push("</tbody></table></div></section>");
}

fn write_preview_row(w: &mut Html, headers: &[(Column, String)], record: &CandidateRecord) {
    w.push("<tr>");
    for (column, _) in headers {
        w.push("<td>");
        w.push(escape(record.get(*column)));
        w.push("</td>");
    }
    w.push("</tr>");
}

fn write_view_section(w: &mut Html, section: &ViewSection<'_>) {
    w.push(format!("<section id=\"{}\"><h2>", section.anchor));
    w.push(escape(section.title));
    w.push("</h2><p class=\"desc\">");
    w.push(escape(&section.description));
    w.push("</p>");
    w.push(section.chart.render_svg());

    match section.table {
        ViewTable::Counts(counts) => write_count_table(w, counts),
        ViewTable::Cross(cross) => write_cross_table(w, cross),
    }
    w.push("</section>");
}

fn write_count_table(w: &mut Html, counts: &CountAggregation) {
    if counts.is_empty() {
        return;
    }
    let heading = counts.column.map(|c| c.label()).unwrap_or("Value");

    w.push("<table><thead><tr><th>");
    w.push(heading);
    w.push("</th><th class=\"num\">Candidates</th></tr></thead><tbody>");
    for entry in counts.sorted_desc() {
        w.push("<tr><td>");
        w.push(escape(&entry.value));
        w.push(format!("</td><td class=\"num\">{}</td></tr>", entry.count));
    }
    w.push(format!(
        "<tr class=\"total\"><td>Total</td><td class=\"num\">{}</td></tr>",
        counts.total()
    ));
    w.push("</tbody></table>");
}

fn write_cross_table(w: &mut Html, cross: &CrossAggregation) {
    if cross.is_empty() {
        return;
    }

    w.push("<div class=\"scroll\"><table><thead><tr><th>");
    w.push(cross.row_column.label());
    w.push("</th>");
    for column in &cross.columns {
        w.push("<th class=\"num\">");
        w.push(escape(column));
        w.push("</th>");
    }
    w.push("<th class=\"num\">Total</th></tr></thead><tbody>");

    for (row, cells) in cross.rows.iter().zip(&cross.cells) {
        w.push("<tr><td>");
        w.push(escape(row));
        w.push("</td>");
        for value in cells {
            w.push(format!("<td class=\"num\">{}</td>", value));
        }
        w.push(format!(
            "<td class=\"num\">{}</td></tr>",
            cells.iter().sum::<usize>()
        ));
    }

    w.push("<tr class=\"total\"><td>Total</td>");
    for total in cross.column_totals() {
        w.push(format!("<td class=\"num\">{}</td>", total));
    }
    w.push(format!("<td class=\"num\">{}</td></tr>", cross.total()));
    w.push("</tbody></table></div>");
}
