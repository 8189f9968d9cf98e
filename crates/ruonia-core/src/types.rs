use chrono::NaiveDate;
use ruonia_parser::DatedSeries;
use serde::Serialize;

use crate::error::{AnalysisError, Result};

/// One entry of a derived sequence; `value` is `None` where the statistic is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

pub(crate) fn measurement(series: &DatedSeries, column: &str) -> Result<Vec<Option<f64>>> {
    if !series.has_column(column) {
        return Err(AnalysisError::MissingColumn {
            series: series.name().to_string(),
            column: column.to_string(),
        });
    }
    Ok(series.values(column)?)
}

pub(crate) fn align(dates: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Vec<DatedValue> {
    dates
        .into_iter()
        .zip(values)
        .map(|(date, value)| DatedValue { date, value })
        .collect()
}

pub fn values_of(sequence: &[DatedValue]) -> Vec<Option<f64>> {
    sequence.iter().map(|entry| entry.value).collect()
}
