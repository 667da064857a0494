//! Candidate filtering and aggregation.
//!
//! This module provides the filter and group-by primitives every dashboard
//! view is built from. All functions take any iterator of record references,
//! so they work on a whole [`Dataset`](crate::models::Dataset) as well as on a
//! [`FilteredView`].

use crate::models::{
    CandidateRecord, Column, CountAggregation, CountEntry, CrossAggregation, FilteredView,
};
use std::collections::{HashMap, HashSet};

/// Unique values of a column, in first-seen order.
pub fn list_distinct<'a, I>(rows: I, column: Column) -> Vec<String>
where
    I: IntoIterator<Item = &'a CandidateRecord>,
{
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut values = Vec::new();

    for row in rows {
        let value = row.get(column);
        if seen.insert(value) {
            values.push(value.to_string());
        }
    }

    values
}

/// Rows whose unit and office both match exactly.
pub fn filter<'a, I>(rows: I, unit: &str, office: &str) -> FilteredView<'a>
where
    I: IntoIterator<Item = &'a CandidateRecord>,
{
    FilteredView::new(
        rows.into_iter()
            .filter(|r| r.unit == unit && r.office == office)
            .collect(),
    )
}

/// Rows whose `column` equals `value` exactly.
pub fn filter_by_column_value<'a, I>(rows: I, column: Column, value: &str) -> FilteredView<'a>
where
    I: IntoIterator<Item = &'a CandidateRecord>,
{
    FilteredView::new(
        rows.into_iter()
            .filter(|r| r.get(column) == value)
            .collect(),
    )
}

/// Occurrences per distinct value of a column.
pub fn count_by<'a, I>(rows: I, column: Column) -> CountAggregation
where
    I: IntoIterator<Item = &'a CandidateRecord>,
{
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut entries: Vec<CountEntry> = Vec::new();

    for row in rows {
        let value = row.get(column);
        match positions.get(value) {
            Some(&pos) => entries[pos].count += 1,
            None => {
                positions.insert(value, entries.len());
                entries.push(CountEntry {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    CountAggregation {
        column: Some(column),
        entries,
    }
}

/// Occurrences per (row value, column value) pair.
///
/// The result is dense: every combination of observed row and column keys
/// has a cell, and pairs that never occur hold 0.
pub fn cross_count_by<'a, I>(rows: I, row_column: Column, col_column: Column) -> CrossAggregation
where
    I: IntoIterator<Item = &'a CandidateRecord>,
{
    let mut cross = CrossAggregation::new(row_column, col_column);
    let mut row_pos: HashMap<&'a str, usize> = HashMap::new();
    let mut col_pos: HashMap<&'a str, usize> = HashMap::new();

    for row in rows {
        let r_key = row.get(row_column);
        let c_key = row.get(col_column);

        let r = *row_pos.entry(r_key).or_insert_with(|| {
            cross.rows.push(r_key.to_string());
            cross.cells.push(vec![0; cross.columns.len()]);
            cross.rows.len() - 1
        });

        let c = match col_pos.get(c_key) {
            Some(&c) => c,
            None => {
                let c = cross.columns.len();
                col_pos.insert(c_key, c);
                cross.ensure_column(c_key);
                c
            }
        };

        cross.cells[r][c] += 1;
    }

    cross
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dataset;

    fn rec(unit: &str, office: &str, gender: &str, party: &str) -> CandidateRecord {
        CandidateRecord {
            unit: unit.to_string(),
            office: office.to_string(),
            education: if party == "PT" {
                "SUPERIOR COMPLETO".to_string()
            } else {
                "ENSINO MÉDIO COMPLETO".to_string()
            },
            gender: gender.to_string(),
            race: "PARDA".to_string(),
            party: party.to_string(),
        }
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                rec("RECIFE", "VEREADOR", "FEMININO", "PT"),
                rec("RECIFE", "VEREADOR", "MASCULINO", "PL"),
                rec("OLINDA", "PREFEITO", "FEMININO", "PSB"),
                rec("RECIFE", "PREFEITO", "MASCULINO", "PT"),
                rec("RECIFE", "VEREADOR", "MASCULINO", "PT"),
                rec("recife", "VEREADOR", "FEMININO", "PT"),
            ],
            vec![],
        )
    }

    #[test]
    fn test_list_distinct_first_seen_no_duplicates() {
        let data = sample();
        let units = list_distinct(&data, Column::Unit);
        assert_eq!(units, vec!["RECIFE", "OLINDA", "recife"]);

        let offices = list_distinct(&data, Column::Office);
        assert_eq!(offices, vec!["VEREADOR", "PREFEITO"]);

        for party in list_distinct(&data, Column::Party) {
            assert!(data.records.iter().any(|r| r.party == party));
        }
    }

    #[test]
    fn test_filter_sound_and_complete() {
        let data = sample();
        let view = filter(&data, "RECIFE", "VEREADOR");

        assert_eq!(view.len(), 3);
        assert!(view.iter().all(|r| r.unit == "RECIFE" && r.office == "VEREADOR"));

        let expected = data
            .records
            .iter()
            .filter(|r| r.unit == "RECIFE" && r.office == "VEREADOR")
            .count();
        assert_eq!(view.len(), expected);
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let data = sample();
        let view = filter(&data, "recife", "VEREADOR");
        assert_eq!(view.len(), 1);
        assert_eq!(view.iter().next().map(|r| r.unit.as_str()), Some("recife"));
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        let data = sample();
        let view = filter(&data, "CARUARU", "VEREADOR");
        assert!(view.is_empty());
    }

    #[test]
    fn test_filter_idempotent() {
        let data = sample();
        let first = filter(&data, "RECIFE", "VEREADOR");
        let second = filter(&data, "RECIFE", "VEREADOR");
        assert_eq!(first, second);
        assert_eq!(data.len(), 6);
    }

    #[test]
    fn test_three_row_scenario() {
        let data = Dataset::new(
            vec![
                rec("unitA", "officeX", "F", "P1"),
                rec("unitA", "officeX", "M", "P2"),
                rec("unitB", "officeY", "F", "P1"),
            ],
            vec![],
        );

        let view = filter(&data, "unitA", "officeX");
        assert_eq!(view.len(), 2);

        let counts = count_by(&view, Column::Gender);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get("F"), Some(1));
        assert_eq!(counts.get("M"), Some(1));
    }

    #[test]
    fn test_count_by_sums_to_view_length() {
        let data = sample();
        let view = filter(&data, "RECIFE", "VEREADOR");

        for column in Column::ALL {
            let counts = count_by(&view, column);
            assert_eq!(counts.total(), view.len());
            assert_eq!(counts.column, Some(column));
        }

        let parties = count_by(&view, Column::Party);
        assert_eq!(parties.get("PT"), Some(2));
        assert_eq!(parties.get("PL"), Some(1));
    }

    #[test]
    fn test_count_by_empty_view() {
        let view = FilteredView::default();
        let counts = count_by(&view, Column::Gender);
        assert!(counts.is_empty());
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_filter_by_column_value() {
        let data = sample();
        let view = filter(&data, "RECIFE", "VEREADOR");
        let women = filter_by_column_value(&view, Column::Gender, "FEMININO");

        assert_eq!(women.len(), 1);
        assert!(women.iter().all(|r| r.gender == "FEMININO"));

        let none = filter_by_column_value(&view, Column::Gender, "feminino");
        assert!(none.is_empty());
    }

    #[test]
    fn test_cross_count_by_dense_and_sums() {
        let data = sample();
        let view = filter(&data, "RECIFE", "VEREADOR");
        let cross = cross_count_by(&view, Column::Party, Column::Gender);

        assert_eq!(cross.rows, vec!["PT", "PL"]);
        assert_eq!(cross.columns, vec!["FEMININO", "MASCULINO"]);
        assert_eq!(cross.total(), view.len());

        // Every row has a cell for every column
        assert!(cross.cells.iter().all(|r| r.len() == cross.columns.len()));
        assert_eq!(cross.get("PT", "FEMININO"), 1);
        assert_eq!(cross.get("PT", "MASCULINO"), 1);
        assert_eq!(cross.get("PL", "FEMININO"), 0);
        assert_eq!(cross.get("PL", "MASCULINO"), 1);
    }

    #[test]
    fn test_cross_count_by_empty_view() {
        let view = FilteredView::default();
        let cross = cross_count_by(&view, Column::Education, Column::Gender);
        assert!(cross.is_empty());
        assert_eq!(cross.total(), 0);
        assert_eq!(cross.get("ANY", "ANY"), 0);
    }
}
