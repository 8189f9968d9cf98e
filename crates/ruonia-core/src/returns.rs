use ruonia_parser::DatedSeries;

use crate::error::Result;
use crate::types::{align, measurement, DatedValue};

/// `(x[i] - x[i-1]) / x[i-1]` over consecutive rows.
///
/// The first entry is `None`, as is any entry whose operands are missing or whose previous
/// value is zero.
pub fn percent_change(series: &DatedSeries, column: &str) -> Result<Vec<DatedValue>> {
    let values = measurement(series, column)?;
    Ok(align(series.dates()?, percent_change_values(&values)))
}

pub fn with_percent_change(series: &DatedSeries, column: &str, alias: &str) -> Result<DatedSeries> {
    let values = measurement(series, column)?;
    Ok(series.with_column(alias, percent_change_values(&values))?)
}

pub fn percent_change_values(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut changes = Vec::with_capacity(values.len());
    if values.is_empty() {
        return changes;
    }
    changes.push(None);
    for pair in values.windows(2) {
        let change = match (pair[0], pair[1]) {
            (Some(previous), Some(current)) if previous != 0.0 => {
                Some((current - previous) / previous)
            }
            _ => None,
        };
        changes.push(change);
    }
    changes
}
