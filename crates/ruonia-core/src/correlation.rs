use ruonia_parser::DatedSeries;
use serde::Serialize;

use crate::error::Result;
use crate::stats::pearson;
use crate::types::measurement;

/// Symmetric matrix of pairwise Pearson coefficients.
///
/// Each pair is computed over the rows where both columns are present. Pairs with fewer than
/// two such rows, or with zero variance, hold `None` rather than being dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub left: String,
    pub right: String,
    pub coefficient: Option<f64>,
}

impl CorrelationMatrix {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `None` when either column is not part of the matrix; `Some(None)` when the
    /// coefficient is undefined.
    pub fn get(&self, left: &str, right: &str) -> Option<Option<f64>> {
        let row = self.position(left)?;
        let col = self.position(right)?;
        Some(self.values[row][col])
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// Upper triangle (excluding the diagonal) in column order.
    pub fn pairs(&self) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for (i, left) in self.columns.iter().enumerate() {
            for (j, right) in self.columns.iter().enumerate().skip(i + 1) {
                pairs.push(CorrelationPair {
                    left: left.clone(),
                    right: right.clone(),
                    coefficient: self.values[i][j],
                });
            }
        }
        pairs
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }
}

pub fn correlation_matrix<S: AsRef<str>>(
    series: &DatedSeries,
    columns: &[S],
) -> Result<CorrelationMatrix> {
    let mut names: Vec<String> = Vec::with_capacity(columns.len());
    let mut data: Vec<Vec<Option<f64>>> = Vec::with_capacity(columns.len());
    for column in columns {
        let column = column.as_ref();
        if names.iter().any(|name| name == column) {
            continue;
        }
        data.push(measurement(series, column)?);
        names.push(column.to_string());
    }

    let n = names.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let coefficient = pearson(&data[i], &data[j]);
            values[i][j] = coefficient;
            values[j][i] = coefficient;
        }
    }

    Ok(CorrelationMatrix {
        columns: names,
        values,
    })
}
