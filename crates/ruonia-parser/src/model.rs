use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::LoadError;

/// Semantic name every source must map its date column to.
pub const DATE_COLUMN: &str = "date";

/// Format used for dates in normalized tables.
pub const NORMALIZED_DATE_FORMAT: &str = "%Y-%m-%d";

// Days between 0001-01-01 and 1970-01-01; polars stores dates as days since the epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Number,
    /// Values written as strings with a trailing `%`, e.g. `-0.35%`.
    Percent,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Number => "number",
            ColumnKind::Percent => "percent",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A measurement column declared by a source schema, named by its semantic (post-rename) name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default)]
    pub kind: ColumnKind,
    #[serde(default)]
    pub required: bool,
}

impl ColumnSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Number,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Number,
            required: false,
        }
    }

    pub fn percent(mut self) -> Self {
        self.kind = ColumnKind::Percent;
        self
    }
}

/// Describes how one delimited source maps onto a [`DatedSeries`].
///
/// The date format is always explicit; sources are never sniffed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSchema {
    pub name: String,
    pub date_format: String,
    /// Raw header -> semantic name. Headers not listed keep their raw name.
    #[serde(default)]
    pub column_map: BTreeMap<String, String>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

impl SourceSchema {
    pub fn new(name: impl Into<String>, date_format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date_format: date_format.into(),
            column_map: BTreeMap::new(),
            columns: Vec::new(),
        }
    }

    pub fn with_mapping(mut self, raw: impl Into<String>, semantic: impl Into<String>) -> Self {
        self.column_map.insert(raw.into(), semantic.into());
        self
    }

    pub fn with_column(mut self, spec: ColumnSpec) -> Self {
        self.columns.push(spec);
        self
    }

    /// Identity schema for tables that were already normalized (`date` plus float columns).
    pub fn normalized<S: AsRef<str>>(name: impl Into<String>, columns: &[S]) -> Self {
        columns.iter().fold(
            Self::new(name, NORMALIZED_DATE_FORMAT),
            |schema, column| schema.with_column(ColumnSpec::optional(column.as_ref())),
        )
    }

    pub fn semantic_name<'a>(&'a self, raw: &'a str) -> &'a str {
        self.column_map
            .get(raw)
            .map(String::as_str)
            .unwrap_or(raw)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|spec| spec.name == name)
    }
}

/// A date-indexed table: a `date` column (polars `Date`) followed by `Float64` measurements.
///
/// Dates are strictly ascending. Missing measurements are nulls.
#[derive(Debug, Clone)]
pub struct DatedSeries {
    name: String,
    df: DataFrame,
}

impl DatedSeries {
    /// Wraps an existing frame after checking the column layout and date ordering.
    pub fn new(name: impl Into<String>, df: DataFrame) -> Result<Self, LoadError> {
        let name = name.into();
        let date_dtype = df
            .column(DATE_COLUMN)
            .map_err(|_| LoadError::Schema {
                source_name: name.clone(),
                column: DATE_COLUMN.to_string(),
            })?
            .dtype()
            .clone();
        if date_dtype != DataType::Date {
            return Err(LoadError::Validation {
                source_name: name,
                message: format!("column '{DATE_COLUMN}' has dtype {date_dtype}, expected date"),
            });
        }

        for column in df.get_columns() {
            if column.name().as_str() == DATE_COLUMN {
                continue;
            }
            if column.dtype() != &DataType::Float64 {
                return Err(LoadError::Validation {
                    source_name: name,
                    message: format!(
                        "measurement column '{}' has dtype {}, expected f64",
                        column.name(),
                        column.dtype()
                    ),
                });
            }
        }

        let series = Self { name, df };
        let dates = series.dates()?;
        if let Some(position) = dates.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(LoadError::Validation {
                source_name: series.name,
                message: format!(
                    "dates must be strictly ascending (row {} is {}, row {} is {})",
                    position,
                    dates[position],
                    position + 1,
                    dates[position + 1]
                ),
            });
        }
        Ok(series)
    }

    /// Builds a series from already-ordered dates and aligned measurement vectors.
    pub fn from_columns(
        name: impl Into<String>,
        dates: &[NaiveDate],
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, LoadError> {
        let name = name.into();
        let days: Vec<i32> = dates.iter().map(|date| date_to_epoch_days(*date)).collect();
        let date_series = Series::new(DATE_COLUMN.into(), days)
            .cast(&DataType::Date)
            .map_err(|err| LoadError::Validation {
                source_name: name.clone(),
                message: format!("failed to cast date column: {err}"),
            })?;

        let mut cols: Vec<Column> = Vec::with_capacity(columns.len() + 1);
        cols.push(date_series.into());
        for (column, values) in columns {
            if values.len() != dates.len() {
                return Err(LoadError::Validation {
                    source_name: name,
                    message: format!(
                        "column '{column}' had {} rows, expected {}",
                        values.len(),
                        dates.len()
                    ),
                });
            }
            cols.push(Series::new(column.as_str().into(), values).into());
        }

        let df = DataFrame::new(cols).map_err(|err| LoadError::Validation {
            source_name: name.clone(),
            message: format!("failed to build dataframe: {err}"),
        })?;
        Self::new(name, df)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Measurement column names in frame order, excluding `date`.
    pub fn measurement_columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != DATE_COLUMN)
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        column != DATE_COLUMN && self.df.column(column).is_ok()
    }

    pub fn dates(&self) -> Result<Vec<NaiveDate>, LoadError> {
        let days = self.df.column(DATE_COLUMN)?.cast(&DataType::Int32)?;
        let days = days.i32()?;
        days.into_iter()
            .enumerate()
            .map(|(row_index, value)| {
                value
                    .and_then(epoch_days_to_date)
                    .ok_or_else(|| LoadError::MalformedInput {
                        source_name: self.name.clone(),
                        row_index,
                        message: "date column contained null or out-of-range value".to_string(),
                    })
            })
            .collect()
    }

    pub fn values(&self, column: &str) -> Result<Vec<Option<f64>>, LoadError> {
        if !self.has_column(column) {
            return Err(LoadError::Schema {
                source_name: self.name.clone(),
                column: column.to_string(),
            });
        }
        let values = self.df.column(column)?.f64()?;
        Ok(values.into_iter().collect())
    }

    /// Returns a new series with `values` appended as column `column`.
    pub fn with_column(&self, column: &str, values: Vec<Option<f64>>) -> Result<Self, LoadError> {
        if values.len() != self.height() {
            return Err(LoadError::Validation {
                source_name: self.name.clone(),
                message: format!(
                    "column '{column}' had {} rows, expected {}",
                    values.len(),
                    self.height()
                ),
            });
        }
        let mut output = self.df.clone();
        let columns: [Column; 1] = [Series::new(column.into(), values).into()];
        output.hstack_mut(&columns)?;
        Ok(Self {
            name: self.name.clone(),
            df: output,
        })
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            df: self.df.clone(),
        }
    }
}

pub(crate) fn date_to_epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub(crate) fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}
