//! CSV parsing into candidate records.

use super::error::DatasetError;
use super::source::SourceScanner;
use crate::config::{ColumnMap, InputConfig};
use crate::models::{CandidateRecord, Column, Dataset};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Text encoding of an input file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Encoding {
    /// UTF-8 (default). Invalid sequences are a parse error.
    #[default]
    #[serde(rename = "utf-8")]
    #[value(name = "utf-8")]
    Utf8,
    /// ISO-8859-1, as used by the electoral court exports.
    #[serde(rename = "latin1")]
    #[value(name = "latin1")]
    Latin1,
}

impl Encoding {
    fn decode(&self, bytes: &[u8]) -> Result<String, String> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| format!("invalid UTF-8: {}", e)),
            // Every Latin-1 byte maps to the code point of the same value
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

/// Parses a delimiter setting into a single byte.
///
/// Accepts any single ASCII character, plus `\t` and `tab` for tabs.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "\t" | "tab" => Ok(b'\t'),
        _ => {
            let bytes = s.as_bytes();
            if bytes.len() == 1 && bytes[0].is_ascii() {
                Ok(bytes[0])
            } else {
                Err(format!(
                    "Delimiter must be a single ASCII character, got {:?}",
                    s
                ))
            }
        }
    }
}

/// Options controlling how delimited text is parsed.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub encoding: Encoding,
    pub trim: bool,
    /// Show a progress bar when loading several files.
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            encoding: Encoding::Utf8,
            trim: true,
            show_progress: false,
        }
    }
}

impl TryFrom<&InputConfig> for LoadOptions {
    type Error = String;

    fn try_from(config: &InputConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            delimiter: parse_delimiter(&config.delimiter)?,
            encoding: config.encoding,
            trim: config.trim,
            show_progress: false,
        })
    }
}

/// Positions of the mapped columns within a header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex([usize; 6]);

impl ColumnIndex {
    fn resolve(
        headers: &[String],
        columns: &ColumnMap,
        origin: &str,
    ) -> Result<Self, DatasetError> {
        let mut idx = [0usize; 6];
        for (slot, column) in idx.iter_mut().zip(Column::ALL) {
            let wanted = columns.header(column);
            *slot = headers.iter().position(|h| h == wanted).ok_or_else(|| {
                DatasetError::ColumnMissing {
                    origin: origin.to_string(),
                    column,
                    header: wanted.to_string(),
                }
            })?;
        }
        Ok(Self(idx))
    }

    fn get(&self, column: Column) -> usize {
        // Column::ALL is in declaration order
        self.0[column as usize]
    }
}

fn csv_error(origin: &str, err: csv::Error) -> DatasetError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    DatasetError::Parse {
        origin: origin.to_string(),
        line,
        message: err.to_string(),
    }
}

/// Parse candidate records from any reader.
///
/// `origin` names the input in error messages.
pub fn load_reader<R: Read>(
    reader: R,
    columns: &ColumnMap,
    options: &LoadOptions,
    origin: &str,
) -> Result<Vec<CandidateRecord>, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(if options.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        })
        .from_reader(reader);

    let raw_headers = rdr
        .byte_headers()
        .map_err(|e| csv_error(origin, e))?
        .clone();
    if raw_headers.is_empty() {
        return Err(DatasetError::Parse {
            origin: origin.to_string(),
            line: 1,
            message: "input has no header row".to_string(),
        });
    }

    let mut headers = Vec::with_capacity(raw_headers.len());
    for field in raw_headers.iter() {
        let header = options
            .encoding
            .decode(field)
            .map_err(|message| DatasetError::Parse {
                origin: origin.to_string(),
                line: 1,
                message,
            })?;
        headers.push(header.trim_start_matches('\u{feff}').to_string());
    }
    debug!("{}: headers {:?}", origin, headers);

    let index = ColumnIndex::resolve(&headers, columns, origin)?;

    let mut records = Vec::new();
    for result in rdr.byte_records() {
        let row = result.map_err(|e| csv_error(origin, e))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let field = |column: Column| -> Result<String, DatasetError> {
            let bytes = row.get(index.get(column)).ok_or_else(|| DatasetError::Parse {
                origin: origin.to_string(),
                line,
                message: format!("record has no {} field", column),
            })?;
            options
                .encoding
                .decode(bytes)
                .map_err(|message| DatasetError::Parse {
                    origin: origin.to_string(),
                    line,
                    message,
                })
        };

        records.push(CandidateRecord {
            unit: field(Column::Unit)?,
            office: field(Column::Office)?,
            education: field(Column::Education)?,
            gender: field(Column::Gender)?,
            race: field(Column::Race)?,
            party: field(Column::Party)?,
        });
    }

    debug!("{}: parsed {} records", origin, records.len());
    Ok(records)
}

/// Load a single CSV file.
pub fn load_file(
    path: &Path,
    columns: &ColumnMap,
    options: &LoadOptions,
) -> Result<Vec<CandidateRecord>, DatasetError> {
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: origin.clone(),
        source,
    })?;
    load_reader(file, columns, options, &origin)
}

/// Load a dataset from a file or a directory of CSV files.
///
/// Files found under a directory are concatenated in sorted path order.
pub fn load_dataset(
    path: &Path,
    columns: &ColumnMap,
    options: &LoadOptions,
) -> Result<Dataset, DatasetError> {
    let files = SourceScanner::new(path.to_path_buf()).scan()?;
    info!("Loading {} source file(s) from {}", files.len(), path.display());

    let progress = if options.show_progress && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.green}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    let mut records = Vec::new();
    let mut sources = Vec::with_capacity(files.len());
    for file in &files {
        if let Some(ref pb) = progress {
            pb.set_message(file.display().to_string());
        }
        let mut rows = load_file(file, columns, options)?;
        debug!("{}: {} rows", file.display(), rows.len());
        records.append(&mut rows);
        sources.push(file.display().to_string());
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    info!("Loaded {} candidate records", records.len());
    Ok(Dataset::new(records, sources))
}
