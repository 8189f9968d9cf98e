use ruonia_parser::DatedSeries;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::stats::{mean, sample_std};
use crate::types::{align, measurement, DatedValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollingKind {
    Mean,
    /// Sample standard deviation (n - 1).
    StdDev,
}

impl RollingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RollingKind::Mean => "mean",
            RollingKind::StdDev => "std",
        }
    }
}

/// Trailing-window statistic over `window` consecutive rows (not calendar days).
///
/// Output is aligned with the input: the first `window - 1` entries, and any window that
/// contains a missing value, are `None`.
pub fn rolling_statistic(
    series: &DatedSeries,
    column: &str,
    window: usize,
    kind: RollingKind,
) -> Result<Vec<DatedValue>> {
    let values = measurement(series, column)?;
    let rolled = rolling_values(&values, window, kind)?;
    Ok(align(series.dates()?, rolled))
}

/// Appends the rolling statistic of `column` as a new column named `alias`.
pub fn with_rolling_column(
    series: &DatedSeries,
    column: &str,
    window: usize,
    kind: RollingKind,
    alias: &str,
) -> Result<DatedSeries> {
    let values = measurement(series, column)?;
    let rolled = rolling_values(&values, window, kind)?;
    Ok(series.with_column(alias, rolled)?)
}

pub fn rolling_values(
    values: &[Option<f64>],
    window: usize,
    kind: RollingKind,
) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(AnalysisError::InvalidWindow(window));
    }

    let rolled = (0..values.len())
        .map(|end| {
            if end + 1 < window {
                return None;
            }
            let observed: Vec<f64> = values[end + 1 - window..=end]
                .iter()
                .copied()
                .collect::<Option<Vec<f64>>>()?;
            match kind {
                RollingKind::Mean => mean(&observed),
                RollingKind::StdDev => sample_std(&observed),
            }
        })
        .collect();
    Ok(rolled)
}
