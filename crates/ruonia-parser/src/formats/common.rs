use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::errors::LoadError;
use crate::model::{ColumnKind, ColumnSpec, DatedSeries, SourceSchema, DATE_COLUMN};

/// Permissive numeric coercion.
///
/// Empty, unparsable, `NaN` and infinite cells become `None` (the missing marker). Never fails.
pub fn coerce_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

/// Like [`coerce_numeric`], after stripping one trailing `%`.
pub fn coerce_percent(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    coerce_numeric(trimmed.strip_suffix('%').unwrap_or(trimmed))
}

pub fn coerce_cell(kind: ColumnKind, value: &str) -> Option<f64> {
    match kind {
        ColumnKind::Number => coerce_numeric(value),
        ColumnKind::Percent => coerce_percent(value),
    }
}

/// Parses `value` with the declared chrono `format`. A format carrying a time component is
/// accepted and truncated to its calendar day.
pub fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, format)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, format)
                .ok()
                .map(|dt| dt.date())
        })
}

fn clean_header(raw: &str) -> &str {
    raw.trim_start_matches('\u{feff}').trim()
}

struct BoundColumn<'a> {
    spec: &'a ColumnSpec,
    index: usize,
    values: Vec<Option<f64>>,
    coerced_to_missing: usize,
}

struct Row {
    row_index: usize,
    date: NaiveDate,
}

/// I/O failures while reading surface as `SourceUnavailable`; `origin` names the file, or the
/// source itself for in-memory readers.
fn read_failure(source_name: &str, origin: Option<&Path>, err: csv::Error) -> LoadError {
    if !err.is_io_error() {
        return LoadError::Csv {
            source_name: source_name.to_string(),
            source: err,
        };
    }
    let path = origin.map_or_else(|| PathBuf::from(source_name), Path::to_path_buf);
    match err.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::SourceUnavailable { path, source },
        other => LoadError::Validation {
            source_name: source_name.to_string(),
            message: format!("unexpected read failure: {other:?}"),
        },
    }
}

pub(crate) fn read_delimited<R: Read>(
    schema: &SourceSchema,
    reader: R,
    origin: Option<&Path>,
) -> Result<DatedSeries, LoadError> {
    let source_name = schema.name.as_str();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|err| read_failure(source_name, origin, err))?
        .clone();

    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (index, raw) in headers.iter().enumerate() {
        let semantic = schema.semantic_name(clean_header(raw));
        if let Some(&first) = positions.get(semantic) {
            debug!(
                source = source_name,
                column = semantic,
                kept = first,
                ignored = index,
                "duplicate header after renaming, keeping the first"
            );
            continue;
        }
        positions.insert(semantic, index);
    }

    let date_index = *positions
        .get(DATE_COLUMN)
        .ok_or_else(|| LoadError::Schema {
            source_name: source_name.to_string(),
            column: DATE_COLUMN.to_string(),
        })?;

    let mut bound: Vec<BoundColumn<'_>> = Vec::with_capacity(schema.columns.len());
    for spec in &schema.columns {
        match positions.get(spec.name.as_str()) {
            Some(&index) => bound.push(BoundColumn {
                spec,
                index,
                values: Vec::new(),
                coerced_to_missing: 0,
            }),
            None if spec.required => {
                return Err(LoadError::Schema {
                    source_name: source_name.to_string(),
                    column: spec.name.clone(),
                });
            }
            None => debug!(source = source_name, column = %spec.name, "optional column absent"),
        }
    }

    for (semantic, index) in &positions {
        if *index != date_index && schema.column(semantic).is_none() {
            debug!(source = source_name, column = *semantic, "ignoring undeclared column");
        }
    }

    let mut rows: Vec<Row> = Vec::new();
    for (row_index, record) in reader.records().enumerate() {
        let record = record.map_err(|err| read_failure(source_name, origin, err))?;

        let raw_date = record.get(date_index).unwrap_or("");
        let date = parse_date(raw_date, &schema.date_format).ok_or_else(|| {
            LoadError::MalformedInput {
                source_name: source_name.to_string(),
                row_index,
                message: format!(
                    "date '{}' does not match format '{}'",
                    raw_date.trim(),
                    schema.date_format
                ),
            }
        })?;

        for column in bound.iter_mut() {
            let raw = record.get(column.index).unwrap_or("");
            let value = coerce_cell(column.spec.kind, raw);
            if value.is_none() && !raw.trim().is_empty() {
                column.coerced_to_missing += 1;
            }
            column.values.push(value);
        }

        rows.push(Row { row_index, date });
    }

    // Sources arrive in either order (the exchange-rate export is newest-first).
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by_key(|&position| rows[position].date);

    for pair in order.windows(2) {
        let (first, second) = (&rows[pair[0]], &rows[pair[1]]);
        if first.date == second.date {
            return Err(LoadError::MalformedInput {
                source_name: source_name.to_string(),
                row_index: first.row_index.max(second.row_index),
                message: format!(
                    "duplicate date {} (also at row {})",
                    first.date,
                    first.row_index.min(second.row_index)
                ),
            });
        }
    }

    let dates: Vec<NaiveDate> = order.iter().map(|&position| rows[position].date).collect();
    let mut columns = Vec::with_capacity(bound.len());
    for column in bound {
        if column.coerced_to_missing > 0 {
            debug!(
                source = source_name,
                column = %column.spec.name,
                cells = column.coerced_to_missing,
                "non-numeric cells coerced to missing"
            );
        }
        let values = order
            .iter()
            .map(|&position| column.values[position])
            .collect();
        columns.push((column.spec.name.clone(), values));
    }

    debug!(source = source_name, rows = dates.len(), "loaded source");
    DatedSeries::from_columns(source_name, &dates, columns)
}
