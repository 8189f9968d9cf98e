use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source {} could not be read: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}: required column '{column}' not present after renaming")]
    Schema { source_name: String, column: String },

    #[error("{source_name} data row {row_index} invalid: {message}")]
    MalformedInput {
        source_name: String,
        row_index: usize,
        message: String,
    },

    #[error("{source_name} CSV error: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("{source_name} validation error: {message}")]
    Validation { source_name: String, message: String },

    #[error("unknown source '{name}'; known sources: {known:?}")]
    UnknownSource {
        name: String,
        known: Vec<&'static str>,
    },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

impl LoadError {
    /// Data-row index (0-based, header excluded) for row-level failures.
    pub fn row_index(&self) -> Option<usize> {
        match self {
            LoadError::MalformedInput { row_index, .. } => Some(*row_index),
            _ => None,
        }
    }
}
