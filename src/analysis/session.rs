//! Dashboard session state and the interactive command loop.
//!
//! A session owns the dataset and the current unit/office selection. Every
//! selection change recomputes the filtered view and the seven derived views.

use super::aggregator::{filter, list_distinct};
use super::views::{build_views, GenderLabels};
use crate::models::{Column, DashboardViews, Dataset, FilterSelection, FilteredView};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

/// Dataset plus the current selection and its derived views.
#[derive(Debug)]
pub struct DashboardSession {
    dataset: Dataset,
    labels: GenderLabels,
    units: Vec<String>,
    offices: Vec<String>,
    selection: FilterSelection,
    views: DashboardViews,
    filtered: usize,
}

impl DashboardSession {
    /// Start a session with an explicit selection. Missing values fall back
    /// to the first unit or office.
    pub fn with_selection(
        dataset: Dataset,
        labels: GenderLabels,
        unit: Option<&str>,
        office: Option<&str>,
    ) -> Self {
        let units = list_distinct(&dataset, Column::Unit);
        let offices = list_distinct(&dataset, Column::Office);

        let pick = |requested: Option<&str>, options: &[String], column: Column| {
            match requested {
                Some(value) => {
                    if !options.iter().any(|o| o == value) {
                        warn!("{} '{}' does not occur in the dataset", column.label(), value);
                    }
                    value.to_string()
                }
                None => options.first().cloned().unwrap_or_default(),
            }
        };

        let selection = FilterSelection {
            unit: pick(unit, &units, Column::Unit),
            office: pick(office, &offices, Column::Office),
        };

        let views = build_views(&FilteredView::default(), &labels);
        let mut session = Self {
            dataset,
            labels,
            units,
            offices,
            selection,
            views,
            filtered: 0,
        };
        session.refresh();
        session
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Distinct units, in first-seen order.
    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Distinct offices, in first-seen order.
    pub fn offices(&self) -> &[String] {
        &self.offices
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Select a unit. Returns false when the value never occurs, in which
    /// case the view is empty until another unit is chosen.
    pub fn select_unit(&mut self, unit: &str) -> bool {
        let known = self.units.iter().any(|u| u == unit);
        if !known {
            warn!("Unit '{}' does not occur in the dataset", unit);
        }
        self.selection.unit = unit.to_string();
        self.refresh();
        known
    }

    /// Select an office. Same rules as [`Self::select_unit`].
    pub fn select_office(&mut self, office: &str) -> bool {
        let known = self.offices.iter().any(|o| o == office);
        if !known {
            warn!("Office '{}' does not occur in the dataset", office);
        }
        self.selection.office = office.to_string();
        self.refresh();
        known
    }

    /// Rows matching the current selection.
    pub fn view(&self) -> FilteredView<'_> {
        filter(&self.dataset, &self.selection.unit, &self.selection.office)
    }

    pub fn views(&self) -> &DashboardViews {
        &self.views
    }

    /// Number of rows matching the current selection.
    pub fn filtered_len(&self) -> usize {
        self.filtered
    }

    fn refresh(&mut self) {
        let view = filter(&self.dataset, &self.selection.unit, &self.selection.office);
        self.filtered = view.len();
        self.views = build_views(&view, &self.labels);
        debug!("Selection {} matches {} rows", self.selection, self.filtered);
    }
}

/// A command typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Units,
    Offices,
    Unit(String),
    Office(String),
    Show,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "units" => Command::Units,
            "offices" => Command::Offices,
            "unit" | "office" if rest.is_empty() => {
                return Err(format!("'{}' needs a value", word));
            }
            "unit" => Command::Unit(rest.to_string()),
            "office" => Command::Office(rest.to_string()),
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("Unknown command '{}'. Type 'help'.", other)),
        };

        Ok(Some(command))
    }
}

const HELP: &str = "\
Commands:
  units           list electoral units
  offices         list offices
  unit <name>     select an electoral unit
  office <name>   select an office
  show            print the dashboard for the current selection
  help            show this help
  quit            leave
";

/// Drive a session from line-oriented input.
///
/// `render` produces the dashboard text for `show` and is called once at
/// start and after every selection change. Ends on `quit` or end of input.
pub fn run_interactive<R, W, F>(
    session: &mut DashboardSession,
    input: R,
    mut output: W,
    render: F,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    F: Fn(&DashboardSession) -> String,
{
    info!(
        "Interactive session over {} rows ({} units, {} offices)",
        session.dataset().len(),
        session.units().len(),
        session.offices().len()
    );

    write!(output, "{}", render(session)).context("Failed to write dashboard")?;
    writeln!(output, "Type 'help' for commands.").context("Failed to write prompt")?;

    for line in input.lines() {
        let line = line.context("Failed to read command")?;

        let command = match Command::parse(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(message) => {
                writeln!(output, "{}", message)?;
                continue;
            }
        };

        match command {
            Command::Units => list_options(&mut output, session.units())?,
            Command::Offices => list_options(&mut output, session.offices())?,
            Command::Unit(name) => {
                if !session.select_unit(&name) {
                    writeln!(output, "No candidates for unit '{}'.", name)?;
                }
                write!(output, "{}", render(session))?;
            }
            Command::Office(name) => {
                if !session.select_office(&name) {
                    writeln!(output, "No candidates for office '{}'.", name)?;
                }
                write!(output, "{}", render(session))?;
            }
            Command::Show => write!(output, "{}", render(session))?,
            Command::Help => write!(output, "{}", HELP)?,
            Command::Quit => break,
        }
        output.flush()?;
    }

    Ok(())
}

fn list_options<W: Write>(output: &mut W, options: &[String]) -> Result<()> {
    for option in options {
        writeln!(output, "  {}", option)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateRecord;

    fn rec(unit: &str, office: &str, gender: &str, party: &str) -> CandidateRecord {
        CandidateRecord {
            unit: unit.to_string(),
            office: office.to_string(),
            education: "SUPERIOR COMPLETO".to_string(),
            gender: gender.to_string(),
            race: "BRANCA".to_string(),
            party: party.to_string(),
        }
    }

    fn new_session(data: Dataset) -> DashboardSession {
        DashboardSession::with_selection(data, GenderLabels::default(), None, None)
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                rec("RECIFE", "VEREADOR", "FEMININO", "PT"),
                rec("RECIFE", "VEREADOR", "MASCULINO", "PL"),
                rec("OLINDA", "PREFEITO", "FEMININO", "PSB"),
                rec("RECIFE", "PREFEITO", "MASCULINO", "PT"),
            ],
            vec![],
        )
    }

    #[test]
    fn test_default_selection_is_first_values() {
        let session = new_session(sample());
        assert_eq!(session.selection().unit, "RECIFE");
        assert_eq!(session.selection().office, "VEREADOR");
        assert_eq!(session.units(), ["RECIFE", "OLINDA"]);
        assert_eq!(session.offices(), ["VEREADOR", "PREFEITO"]);
        assert_eq!(session.filtered_len(), 2);
        assert_eq!(session.views().gender.total(), 2);
    }

    #[test]
    fn test_selection_change_recomputes_views() {
        let mut session = new_session(sample());
        assert!(session.select_office("PREFEITO"));
        assert_eq!(session.filtered_len(), 1);
        assert_eq!(session.views().party_male.get("PT"), Some(1));
        assert!(session.views().party_female.is_empty());

        assert!(session.select_unit("OLINDA"));
        assert_eq!(session.view().len(), 1);
        assert_eq!(session.views().party_female.get("PSB"), Some(1));
    }

    #[test]
    fn test_unknown_selection_gives_empty_view() {
        let mut session = new_session(sample());
        assert!(!session.select_unit("CARUARU"));
        assert!(session.view().is_empty());
        assert!(session.views().education.is_empty());
        assert_eq!(session.views().party_by_gender.total(), 0);
    }

    #[test]
    fn test_with_selection_and_empty_dataset() {
        let session = DashboardSession::with_selection(
            sample(),
            GenderLabels::default(),
            Some("OLINDA"),
            Some("PREFEITO"),
        );
        assert_eq!(session.filtered_len(), 1);

        let empty = new_session(Dataset::default());
        assert_eq!(empty.selection().unit, "");
        assert!(empty.view().is_empty());
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("units"), Ok(Some(Command::Units)));
        assert_eq!(
            Command::parse("  unit  SAO PAULO "),
            Ok(Some(Command::Unit("SAO PAULO".to_string())))
        );
        assert_eq!(Command::parse("QUIT"), Ok(Some(Command::Quit)));
        assert_eq!(Command::parse(""), Ok(None));
        assert!(Command::parse("office").is_err());
        assert!(Command::parse("plot").is_err());
    }

    #[test]
    fn test_run_interactive_script() {
        let mut session = new_session(sample());
        let input = b"units\noffice PREFEITO\nunit CARUARU\nbogus\nquit\nunits\n";
        let mut out = Vec::new();

        run_interactive(&mut session, &input[..], &mut out, |s| {
            format!("[{} rows]\n", s.filtered_len())
        })
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[2 rows]\n"));
        assert!(text.contains("  OLINDA\n"));
        assert!(text.contains("[1 rows]\n"));
        assert!(text.contains("No candidates for unit 'CARUARU'."));
        assert!(text.contains("Unknown command 'bogus'"));
        // Input after quit is ignored
        assert_eq!(text.matches("  RECIFE\n").count(), 1);
        assert_eq!(session.selection().unit, "CARUARU");
    }
}
