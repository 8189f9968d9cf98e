use chrono::NaiveDate;
use ruonia_parser::DatedSeries;
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::stats::{mean, sample_std};
use crate::types::measurement;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

pub fn summarize(series: &DatedSeries, column: &str) -> Result<ColumnSummary> {
    let values = measurement(series, column)?;
    let dates = series.dates()?;

    let observed: Vec<(NaiveDate, f64)> = dates
        .iter()
        .zip(&values)
        .filter_map(|(date, value)| value.map(|v| (*date, v)))
        .collect();
    let numbers: Vec<f64> = observed.iter().map(|(_, v)| *v).collect();

    Ok(ColumnSummary {
        column: column.to_string(),
        count: numbers.len(),
        missing: values.len() - numbers.len(),
        mean: mean(&numbers),
        std: sample_std(&numbers),
        min: numbers.iter().copied().reduce(f64::min),
        max: numbers.iter().copied().reduce(f64::max),
        first_date: observed.first().map(|(date, _)| *date),
        last_date: observed.last().map(|(date, _)| *date),
    })
}

pub fn histogram(series: &DatedSeries, column: &str, bins: usize) -> Result<Vec<HistogramBin>> {
    let values = measurement(series, column)?;
    let numbers: Vec<f64> = values.into_iter().flatten().collect();
    histogram_values(&numbers, bins)
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
pub fn histogram_values(values: &[f64], bins: usize) -> Result<Vec<HistogramBin>> {
    if bins == 0 {
        return Err(AnalysisError::InvalidBins(bins));
    }
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Ok(Vec::new());
    };

    let (lower, upper) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (upper - lower) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in values {
        let index = (((value - lower) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| HistogramBin {
            lower: lower + width * index as f64,
            upper: if index + 1 == bins {
                upper
            } else {
                lower + width * (index + 1) as f64
            },
            count,
        })
        .collect())
}
