//! Errors raised while loading a dataset.

use crate::models::Column;
use thiserror::Error;

/// Why a dataset could not be loaded.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid delimited text.
    #[error("{origin}: line {line}: {message}")]
    Parse {
        origin: String,
        line: u64,
        message: String,
    },

    /// A mapped column is absent from the header row.
    #[error("{origin}: missing column '{header}' (mapped to {column})")]
    ColumnMissing {
        origin: String,
        column: Column,
        header: String,
    },

    /// A directory source contained no CSV files.
    #[error("no CSV files found under {path}")]
    NoSources { path: String },
}

impl DatasetError {
    /// The logical column that was missing, if that is the cause.
    pub fn missing_column(&self) -> Option<Column> {
        match self {
            DatasetError::ColumnMissing { column, .. } => Some(*column),
            _ => None,
        }
    }
}
