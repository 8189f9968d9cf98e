// crates/ruonia-core/src/error.rs

use ruonia_parser::LoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("series '{series}' has no measurement column '{column}'")]
    MissingColumn { series: String, column: String },

    #[error("column '{column}' exists in both '{left}' and '{right}'; rename one before joining")]
    ColumnCollision {
        left: String,
        right: String,
        column: String,
    },

    #[error("rolling window must be at least 1, got {0}")]
    InvalidWindow(usize),

    #[error("histogram needs at least 1 bin, got {0}")]
    InvalidBins(usize),

    #[error("analysis '{analysis}' requires source '{source_name}'")]
    MissingSource {
        analysis: &'static str,
        source_name: &'static str,
    },

    #[error("Loading failed: {0}")]
    Load(#[from] LoadError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
