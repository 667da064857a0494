//! Markdown, JSON and terminal report generation.
//!
//! This module turns a [`DashboardReport`] into a Markdown document with
//! one section per dashboard view, or into pretty-printed JSON.

use super::chart::{BarChart, Chart, DonutChart, StackedBarChart};
use crate::analysis::ColorScale;
use crate::config::ReportConfig;
use crate::models::{
    CandidateRecord, Column, CountAggregation, CrossAggregation, DashboardReport,
    DashboardViews, FilterSelection, ReportMetadata,
};
use anyhow::{Context, Result};
use std::path::Path;

/// Data behind one dashboard section.
#[derive(Debug, Clone, Copy)]
pub enum ViewTable<'a> {
    Counts(&'a CountAggregation),
    Cross(&'a CrossAggregation),
}

/// One dashboard view with its chart.
#[derive(Debug, Clone)]
pub struct ViewSection<'a> {
    pub anchor: &'static str,
    pub title: &'static str,
    pub description: String,
    pub table: ViewTable<'a>,
    pub chart: Chart,
}

/// The seven dashboard sections, in display order.
pub fn dashboard_sections<'a>(
    views: &'a DashboardViews,
    config: &ReportConfig,
) -> Vec<ViewSection<'a>> {
    let palette = &config.palette;
    let primary = palette
        .first()
        .cloned()
        .unwrap_or_else(|| "#02C028".to_string());

    vec![
        ViewSection {
            anchor: "education",
            title: "Distribution by Education Level",
            description: "Candidates per education level.".to_string(),
            table: ViewTable::Counts(&views.education),
            chart: Chart::Bar(
                BarChart::new("Distribution by Education Level", &views.education)
                    .with_color(primary),
            ),
        },
        ViewSection {
            anchor: "education-by-gender",
            title: "Education Level by Gender",
            description: "Candidates per education level, split by gender.".to_string(),
            table: ViewTable::Cross(&views.education_by_gender),
            chart: Chart::Stacked(StackedBarChart::new(
                "Education Level by Gender",
                &views.education_by_gender,
                palette,
            )),
        },
        ViewSection {
            anchor: "race",
            title: "Race/Color Distribution",
            description: "Share of candidates per race/color.".to_string(),
            table: ViewTable::Counts(&views.race),
            chart: Chart::Donut(DonutChart::new(
                "Race/Color Distribution",
                &views.race,
                palette,
            )),
        },
        ViewSection {
            anchor: "gender",
            title: "Gender Distribution",
            description: "Share of candidates per gender.".to_string(),
            table: ViewTable::Counts(&views.gender),
            chart: Chart::Donut(DonutChart::new("Gender Distribution", &views.gender, palette)),
        },
        ViewSection {
            anchor: "female-by-party",
            title: "Female Candidates by Party",
            description: format!(
                "Candidates with gender {} per party, shaded by count.",
                config.female_label
            ),
            table: ViewTable::Counts(&views.party_female),
            chart: Chart::Bar(
                BarChart::new("Female Candidates by Party", &views.party_female)
                    .with_scale(ColorScale::from_counts(&views.party_female)),
            ),
        },
        ViewSection {
            anchor: "male-by-party",
            title: "Male Candidates by Party",
            description: format!(
                "Candidates with gender {} per party, shaded by count.",
                config.male_label
            ),
            table: ViewTable::Counts(&views.party_male),
            chart: Chart::Bar(
                BarChart::new("Male Candidates by Party", &views.party_male)
                    .with_scale(ColorScale::from_counts(&views.party_male)),
            ),
        },
        ViewSection {
            anchor: "party-by-gender",
            title: "Male and Female Candidates by Party",
            description: "Candidates per party, split by gender.".to_string(),
            table: ViewTable::Cross(&views.party_by_gender),
            chart: Chart::Stacked(StackedBarChart::new(
                "Male and Female Candidates by Party",
                &views.party_by_gender,
                palette,
            )),
        },
    ]
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &DashboardReport, config: &ReportConfig) -> String {
    let mut output = String::new();
    let sections = dashboard_sections(&report.views, config);

    // Title
    output.push_str(&format!("# {}\n\n", report.metadata.title));

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_selection_section(&report.selection));
    output.push_str(&generate_table_of_contents(&sections));
    output.push_str(&generate_preview_section(
        &report.headers,
        &report.preview,
        report.metadata.filtered_records,
    ));

    for section in &sections {
        output.push_str(&generate_view_section(section, config.bar_width));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Input:** `{}`\n", metadata.input));
    if metadata.sources.len() > 1 {
        section.push_str(&format!("- **Files Loaded:** {}\n", metadata.sources.len()));
    }
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Total Candidates:** {}\n",
        metadata.total_records
    ));
    section.push_str(&format!(
        "- **Matching Candidates:** {}\n",
        metadata.filtered_records
    ));
    section.push_str(&format!(
        "- **Processing Time:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the selection section.
fn generate_selection_section(selection: &FilterSelection) -> String {
    let mut section = String::new();

    section.push_str("## Selection\n\n");
    section.push_str(&format!(
        "- **{}:** {}\n",
        Column::Unit.label(),
        escape_cell(&selection.unit)
    ));
    section.push_str(&format!(
        "- **{}:** {}\n\n",
        Column::Office.label(),
        escape_cell(&selection.office)
    ));

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(sections: &[ViewSection<'_>]) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Selection](#selection)\n");
    toc.push_str("- [Data Preview](#data-preview)\n");
    for (i, section) in sections.iter().enumerate() {
        toc.push_str(&format!("- [{}. {}](#{})\n", i + 1, section.title, section.anchor));
    }
    toc.push('\n');

    toc
}

/// Generate the data preview table.
fn generate_preview_section(
    headers: &[(Column, String)],
    preview: &[CandidateRecord],
    matching: usize,
) -> String {
    let mut section = String::new();

    section.push_str("## Data Preview\n\n");

    if preview.is_empty() {
        section.push_str("No candidates match the current selection.\n\n");
        return section;
    }

    if matching > preview.len() {
        section.push_str(&format!(
            "*Showing {} of {} matching rows.*\n\n",
            preview.len(),
            matching
        ));
    }

    let names: Vec<String> = headers.iter().map(|(_, h)| escape_cell(h)).collect();
    section.push_str(&format!("| {} |\n", names.join(" | ")));
    section.push_str(&format!("|{}\n", ":---|".repeat(headers.len())));

    for record in preview {
        let cells: Vec<String> = headers
            .iter()
            .map(|(column, _)| escape_cell(record.get(*column)))
            .collect();
        section.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    section.push('\n');

    section
}

/// Generate one view section: table plus text chart.
fn generate_view_section(view: &ViewSection<'_>, bar_width: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!("<a id=\"{}\"></a>\n\n", view.anchor));
    section.push_str(&format!("## {}\n\n", view.title));
    section.push_str(&format!("*{}*\n\n", view.description));

    match view.table {
        ViewTable::Counts(counts) => section.push_str(&generate_count_table(counts)),
        ViewTable::Cross(cross) => section.push_str(&generate_cross_table(cross)),
    }

    section.push_str("```text\n");
    section.push_str(&view.chart.render_text(bar_width));
    section.push_str("```\n\n");

    section
}

/// Count table, largest first, with each value's share of the total.
fn generate_count_table(counts: &CountAggregation) -> String {
    if counts.is_empty() {
        return "No data for this selection.\n\n".to_string();
    }

    let mut table = String::new();
    let heading = counts.column.map(|c| c.label()).unwrap_or("Value");
    let total = counts.total();

    table.push_str(&format!("| {} | Candidates | Share |\n", heading));
    table.push_str("|:---|---:|---:|\n");
    for entry in counts.sorted_desc() {
        table.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            escape_cell(&entry.value),
            entry.count,
            entry.count as f64 / total as f64 * 100.0
        ));
    }
    table.push_str(&format!("| **Total** | **{}** | |\n\n", total));

    table
}

/// Two-way table with row and column totals.
fn generate_cross_table(cross: &CrossAggregation) -> String {
    if cross.is_empty() {
        return "No data for this selection.\n\n".to_string();
    }

    let mut table = String::new();
    let columns: Vec<String> = cross.columns.iter().map(|c| escape_cell(c)).collect();

    table.push_str(&format!(
        "| {} | {} | Total |\n",
        cross.row_column.label(),
        columns.join(" | ")
    ));
    table.push_str(&format!("|:---|{}---:|\n", "---:|".repeat(columns.len())));

    for (row, cells) in cross.rows.iter().zip(&cross.cells) {
        let values: Vec<String> = cells.iter().map(|v| v.to_string()).collect();
        table.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(row),
            values.join(" | "),
            cells.iter().sum::<usize>()
        ));
    }

    let totals: Vec<String> = cross
        .column_totals()
        .iter()
        .map(|v| format!("**{}**", v))
        .collect();
    table.push_str(&format!(
        "| **Total** | {} | **{}** |\n\n",
        totals.join(" | "),
        cross.total()
    ));

    table
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by candidash v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

// Keeps a value inside one table cell: pipes escaped, line breaks flattened.
fn escape_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

/// Plain-text dashboard for the interactive terminal session.
pub fn generate_text_dashboard(
    selection: &FilterSelection,
    matching: usize,
    views: &DashboardViews,
    config: &ReportConfig,
) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n== {} ({} candidates) ==\n\n",
        selection, matching
    ));

    for (i, section) in dashboard_sections(views, config).iter().enumerate() {
        let heading = format!("{}. {}", i + 1, section.title);
        output.push_str(&format!("{}\n{}\n", heading, "-".repeat(heading.chars().count())));
        output.push_str(&section.chart.render_text(config.bar_width));
        output.push('\n');
    }

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
