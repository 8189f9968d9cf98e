pub mod analyses;
pub mod config;
pub mod correlation;
pub mod error;
pub mod join;
pub mod outputs;
pub mod returns;
pub mod rolling;
pub mod summary;
pub mod types;

mod stats;

pub use error::{AnalysisError, Result};
pub use types::DatedValue;
