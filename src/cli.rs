//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::dataset::{parse_delimiter, Encoding};
use crate::models::Column;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Candidash - statistics and charts for electoral candidate exports
///
/// Loads a CSV of candidate records, filters it by electoral unit and
/// office, and reports education, race/color, gender and party breakdowns
/// as Markdown, JSON or a self-contained HTML dashboard.
///
/// Examples:
///   candidash --input candidates.csv
///   candidash --input consulta_cand_2024/ --preset tse --unit RECIFE --office VEREADOR
///   candidash --input candidates.csv --list unit
///   candidash --input candidates.csv --format html --output dashboard.html
///   candidash --input candidates.csv --interactive
///   candidash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// CSV file, or directory of CSV files, with candidate records
    #[arg(short, long, value_name = "PATH", env = "CANDIDASH_INPUT")]
    pub input: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .candidash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Column-name preset (generic, tse)
    ///
    /// Overrides the [columns] section of the config file.
    #[arg(long, value_name = "PRESET")]
    pub preset: Option<ColumnPreset>,

    /// Electoral unit to select (defaults to the first unit in the file)
    #[arg(short, long, value_name = "NAME")]
    pub unit: Option<String>,

    /// Office to select (defaults to the first office in the file)
    #[arg(long, value_name = "NAME")]
    pub office: Option<String>,

    /// Field delimiter (single character, or "\t" / "tab")
    #[arg(short, long, value_name = "CHAR")]
    pub delimiter: Option<String>,

    /// Input text encoding (utf-8, latin1)
    #[arg(long, value_name = "ENCODING")]
    pub encoding: Option<Encoding>,

    /// Output format (markdown, json, html)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file path for the report (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report title
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Number of filtered rows shown in the data preview
    #[arg(long, value_name = "COUNT")]
    pub preview_rows: Option<usize>,

    /// Print the distinct values of a column and exit
    #[arg(long, value_name = "COLUMN", conflicts_with = "interactive")]
    pub list: Option<Column>,

    /// Choose unit and office interactively from stdin
    #[arg(long)]
    pub interactive: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .candidash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// Self-contained HTML page with SVG charts
    Html,
}

/// Built-in column-name mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColumnPreset {
    /// unit, office, education-level, gender, race/color, party
    Generic,
    /// NM_UE, DS_CARGO, DS_GRAU_INSTRUCAO, DS_GENERO, DS_COR_RACA, SG_PARTIDO
    Tse,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref delimiter) = self.delimiter {
            parse_delimiter(delimiter)?;
        }

        if self.preview_rows == Some(0) {
            return Err("Preview rows must be at least 1".to_string());
        }

        // Validate input path if provided
        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input path does not exist: {}", input.display()));
            }
        }

        if self.interactive && self.output.is_some() {
            return Err("Cannot use --output with --interactive".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
