//! Data models for the candidate dashboard.
//!
//! This module contains the core data structures used throughout the
//! application: candidate records, filtered views, count tables and the
//! final dashboard report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A logical column of the candidate table.
///
/// The header name each column is read from is resolved through
/// [`crate::config::ColumnMap`], so nothing here depends on the layout of a
/// particular export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    /// Electoral unit (constituency) the candidate runs in.
    Unit,
    /// Office being contested.
    Office,
    /// Education level description.
    Education,
    /// Gender description.
    Gender,
    /// Race/color description.
    Race,
    /// Party acronym.
    Party,
}

impl Column {
    /// All columns, in the order they appear in previews.
    pub const ALL: [Column; 6] = [
        Column::Unit,
        Column::Office,
        Column::Education,
        Column::Gender,
        Column::Race,
        Column::Party,
    ];

    /// Human-readable label used in report headings and axes.
    pub fn label(&self) -> &'static str {
        match self {
            Column::Unit => "Electoral Unit",
            Column::Office => "Office",
            Column::Education => "Education Level",
            Column::Gender => "Gender",
            Column::Race => "Race/Color",
            Column::Party => "Party",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Unit => write!(f, "unit"),
            Column::Office => write!(f, "office"),
            Column::Education => write!(f, "education"),
            Column::Gender => write!(f, "gender"),
            Column::Race => write!(f, "race"),
            Column::Party => write!(f, "party"),
        }
    }
}

/// A single candidate row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub unit: String,
    pub office: String,
    pub education: String,
    pub gender: String,
    pub race: String,
    pub party: String,
}

impl CandidateRecord {
    /// Returns the value stored under the given logical column.
    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::Unit => &self.unit,
            Column::Office => &self.office,
            Column::Education => &self.education,
            Column::Gender => &self.gender,
            Column::Race => &self.race,
            Column::Party => &self.party,
        }
    }
}

/// The full table of candidates loaded from one or more files.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Rows in input order.
    pub records: Vec<CandidateRecord>,
    /// Files that contributed rows, in load order.
    pub sources: Vec<String>,
}

impl Dataset {
    pub fn new(records: Vec<CandidateRecord>, sources: Vec<String>) -> Self {
        Self { records, sources }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A view over every row of the dataset.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::new(self.records.iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a CandidateRecord;
    type IntoIter = std::slice::Iter<'a, CandidateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// The unit/office pair currently selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub unit: String,
    pub office: String,
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.unit, self.office)
    }
}

/// A borrowed subsequence of a dataset.
///
/// Views never own or mutate rows; filtering a view produces a new view
/// over the same records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView<'a> {
    rows: Vec<&'a CandidateRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn new(rows: Vec<&'a CandidateRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CandidateRecord> + '_ {
        self.rows.iter().copied()
    }

    /// Clones the first `n` rows, for previews.
    pub fn head(&self, n: usize) -> Vec<CandidateRecord> {
        self.rows.iter().take(n).map(|r| (*r).clone()).collect()
    }
}

impl<'a, 'b> IntoIterator for &'b FilteredView<'a> {
    type Item = &'a CandidateRecord;
    type IntoIter = std::iter::Copied<std::slice::Iter<'b, &'a CandidateRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter().copied()
    }
}

/// One bucket of a [`CountAggregation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub value: String,
    pub count: usize,
}

/// Occurrences per distinct value of a column.
///
/// Entries are kept in first-seen order. Callers must not rely on any
/// particular ordering between equal counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountAggregation {
    pub column: Option<Column>,
    pub entries: Vec<CountEntry>,
}

impl CountAggregation {
    #[allow(dead_code)] // Utility for callers sizing tables
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count for a value, if it occurred at all.
    #[allow(dead_code)] // Utility for keyed lookups
    pub fn get(&self, value: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.count)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Smallest and largest count, or `None` when empty.
    pub fn min_max(&self) -> Option<(usize, usize)> {
        let min = self.entries.iter().map(|e| e.count).min()?;
        let max = self.entries.iter().map(|e| e.count).max()?;
        Some((min, max))
    }

    /// Entries sorted by descending count. Ties keep first-seen order.
    pub fn sorted_desc(&self) -> Vec<CountEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|e| std::cmp::Reverse(e.count));
        entries
    }
}

/// A two-way count table.
///
/// Row and column keys are kept in first-seen order and every
/// (row, column) cell is present; missing combinations hold 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossAggregation {
    pub row_column: Column,
    pub col_column: Column,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `cells[r][c]` is the count for `rows[r]` x `columns[c]`.
    pub cells: Vec<Vec<usize>>,
}

impl CrossAggregation {
    pub fn new(row_column: Column, col_column: Column) -> Self {
        Self {
            row_column,
            col_column,
            rows: Vec::new(),
            columns: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Count for a pair of keys. Unknown keys count as 0.
    #[allow(dead_code)] // Utility for keyed lookups
    pub fn get(&self, row: &str, col: &str) -> usize {
        let r = self.rows.iter().position(|k| k == row);
        let c = self.columns.iter().position(|k| k == col);
        match (r, c) {
            (Some(r), Some(c)) => self.cells[r][c],
            _ => 0,
        }
    }

    /// Totals per column key, aligned with `columns`.
    pub fn column_totals(&self) -> Vec<usize> {
        (0..self.columns.len())
            .map(|c| self.cells.iter().map(|row| row[c]).sum())
            .collect()
    }

    /// Sum of every cell.
    pub fn total(&self) -> usize {
        self.cells.iter().flatten().sum()
    }

    /// Adds a zero-filled column for `key` if it is not already present.
    pub fn ensure_column(&mut self, key: &str) {
        if self.columns.iter().any(|k| k == key) {
            return;
        }
        self.columns.push(key.to_string());
        for row in &mut self.cells {
            row.push(0);
        }
    }

    /// Moves `keys` to the front of `columns` in the given order, adding any
    /// that are absent. Other columns follow in their existing order.
    pub fn lead_columns(&mut self, keys: &[&str]) {
        for key in keys {
            self.ensure_column(key);
        }

        let mut order: Vec<usize> = Vec::with_capacity(self.columns.len());
        for key in keys {
            if let Some(i) = self.columns.iter().position(|c| c == key) {
                if !order.contains(&i) {
                    order.push(i);
                }
            }
        }
        for i in 0..self.columns.len() {
            if !order.contains(&i) {
                order.push(i);
            }
        }

        self.columns = order.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.cells {
            *row = order.iter().map(|&i| row[i]).collect();
        }
    }
}

/// The seven derived views shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardViews {
    pub education: CountAggregation,
    pub education_by_gender: CrossAggregation,
    pub race: CountAggregation,
    pub gender: CountAggregation,
    pub party_female: CountAggregation,
    pub party_male: CountAggregation,
    pub party_by_gender: CrossAggregation,
}

/// Metadata about a generated dashboard report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report title.
    pub title: String,
    /// Path given as input.
    pub input: String,
    /// Files that were actually loaded.
    pub sources: Vec<String>,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Rows in the full dataset.
    pub total_records: usize,
    /// Rows matching the selection.
    pub filtered_records: usize,
    /// Load and aggregation time in seconds.
    pub duration_seconds: f64,
}

/// The complete dashboard report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    pub selection: FilterSelection,
    /// Header names the logical columns were read from.
    pub headers: Vec<(Column, String)>,
    /// First rows of the filtered view.
    pub preview: Vec<CandidateRecord>,
    pub views: DashboardViews,
}
