//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.candidash.toml` files.

use crate::cli::{ColumnPreset, OutputFormat};
use crate::dataset::Encoding;
use crate::models::Column;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".candidash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Header name of each logical column.
    #[serde(default)]
    pub columns: ColumnMap,

    /// Input parsing settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Default input file or directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            input: None,
            format: OutputFormat::default(),
        }
    }
}

fn default_title() -> String {
    "Candidate Analysis - 2024 Elections".to_string()
}

/// Maps each logical column to the header it is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    #[serde(default = "default_unit_header")]
    pub unit: String,
    #[serde(default = "default_office_header")]
    pub office: String,
    #[serde(default = "default_education_header")]
    pub education: String,
    #[serde(default = "default_gender_header")]
    pub gender: String,
    #[serde(default = "default_race_header")]
    pub race: String,
    #[serde(default = "default_party_header")]
    pub party: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::generic()
    }
}

fn default_unit_header() -> String {
    "unit".to_string()
}

fn default_office_header() -> String {
    "office".to_string()
}

fn default_education_header() -> String {
    "education-level".to_string()
}

fn default_gender_header() -> String {
    "gender".to_string()
}

fn default_race_header() -> String {
    "race/color".to_string()
}

fn default_party_header() -> String {
    "party".to_string()
}

impl ColumnMap {
    /// Plain English headers.
    pub fn generic() -> Self {
        Self {
            unit: default_unit_header(),
            office: default_office_header(),
            education: default_education_header(),
            gender: default_gender_header(),
            race: default_race_header(),
            party: default_party_header(),
        }
    }

    /// Column codes used by the Brazilian electoral court candidate exports.
    pub fn tse() -> Self {
        Self {
            unit: "NM_UE".to_string(),
            office: "DS_CARGO".to_string(),
            education: "DS_GRAU_INSTRUCAO".to_string(),
            gender: "DS_GENERO".to_string(),
            race: "DS_COR_RACA".to_string(),
            party: "SG_PARTIDO".to_string(),
        }
    }

    pub fn from_preset(preset: ColumnPreset) -> Self {
        match preset {
            ColumnPreset::Generic => Self::generic(),
            ColumnPreset::Tse => Self::tse(),
        }
    }

    /// Header name for a logical column.
    pub fn header(&self, column: Column) -> &str {
        match column {
            Column::Unit => &self.unit,
            Column::Office => &self.office,
            Column::Education => &self.education,
            Column::Gender => &self.gender,
            Column::Race => &self.race,
            Column::Party => &self.party,
        }
    }

    /// Header names for every column, in preview order.
    pub fn headers(&self) -> Vec<(Column, String)> {
        Column::ALL
            .iter()
            .map(|c| (*c, self.header(*c).to_string()))
            .collect()
    }
}

/// Input parsing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Field delimiter; must be a single byte. Use "\t" for tabs.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Text encoding of the input files.
    #[serde(default)]
    pub encoding: Encoding,

    /// Trim surrounding whitespace from headers and values.
    #[serde(default = "default_true")]
    pub trim: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            encoding: Encoding::default(),
            trim: true,
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_true() -> bool {
    true
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of filtered rows shown in the data preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Gender value identifying female candidates.
    #[serde(default = "default_female_label")]
    pub female_label: String,

    /// Gender value identifying male candidates.
    #[serde(default = "default_male_label")]
    pub male_label: String,

    /// Width in characters of the longest text bar.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,

    /// Series colors for stacked and donut charts.
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            preview_rows: default_preview_rows(),
            female_label: default_female_label(),
            male_label: default_male_label(),
            bar_width: default_bar_width(),
            palette: default_palette(),
        }
    }
}

fn default_preview_rows() -> usize {
    20
}

fn default_female_label() -> String {
    "FEMININO".to_string()
}

fn default_male_label() -> String {
    "MASCULINO".to_string()
}

fn default_bar_width() -> usize {
    40
}

fn default_palette() -> Vec<String> {
    vec!["#02C028".to_string(), "#026014".to_string()]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the user passed explicitly are applied.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.general.input = Some(input.display().to_string());
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(ref title) = args.title {
            self.general.title = title.clone();
        }

        // A preset replaces the whole mapping
        if let Some(preset) = args.preset {
            self.columns = ColumnMap::from_preset(preset);
        }

        if let Some(ref delimiter) = args.delimiter {
            self.input.delimiter = delimiter.clone();
        }
        if let Some(encoding) = args.encoding {
            self.input.encoding = encoding;
        }

        if let Some(rows) = args.preview_rows {
            self.report.preview_rows = rows;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.columns, ColumnMap::generic());
        assert_eq!(config.input.delimiter, ",");
        assert_eq!(config.input.encoding, Encoding::Utf8);
        assert_eq!(config.report.female_label, "FEMININO");
        assert_eq!(config.report.male_label, "MASCULINO");
        assert_eq!(config.report.preview_rows, 20);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
title = "Municipal 2024"
format = "html"

[columns]
unit = "NM_UE"
office = "DS_CARGO"

[input]
delimiter = ";"
encoding = "latin1"

[report]
preview_rows = 5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.title, "Municipal 2024");
        assert_eq!(config.general.format, OutputFormat::Html);
        assert_eq!(config.columns.unit, "NM_UE");
        assert_eq!(config.columns.office, "DS_CARGO");
        // Unspecified columns keep their defaults
        assert_eq!(config.columns.party, "party");
        assert_eq!(config.input.delimiter, ";");
        assert_eq!(config.input.encoding, Encoding::Latin1);
        assert!(config.input.trim);
        assert_eq!(config.report.preview_rows, 5);
        assert_eq!(config.report.bar_width, 40);
    }

    #[test]
    fn test_tse_preset_headers() {
        let columns = ColumnMap::tse();
        assert_eq!(columns.header(Column::Unit), "NM_UE");
        assert_eq!(columns.header(Column::Education), "DS_GRAU_INSTRUCAO");
        assert_eq!(columns.header(Column::Party), "SG_PARTIDO");
        assert_eq!(columns.headers().len(), 6);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[columns]"));
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.columns, ColumnMap::generic());
    }

    #[test]
    fn test_merge_with_args() {
        use clap::Parser;

        let args = crate::cli::Args::try_parse_from([
            "candidash",
            "--preset",
            "tse",
            "--delimiter",
            ";",
            "--title",
            "Recife 2024",
            "--preview-rows",
            "3",
            "--format",
            "json",
        ])
        .unwrap();

        let mut config = Config::default();
        config.input.encoding = Encoding::Latin1;
        config.merge_with_args(&args);

        assert_eq!(config.columns, ColumnMap::tse());
        assert_eq!(config.input.delimiter, ";");
        assert_eq!(config.general.title, "Recife 2024");
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.report.preview_rows, 3);
        // Not passed on the command line, so the file value stays
        assert_eq!(config.input.encoding, Encoding::Latin1);
    }
}
