use polars::prelude::*;
use ruonia_parser::{DatedSeries, DATE_COLUMN};
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// Inner-joins two series on `date`.
///
/// Dates present in only one input are dropped. The result is sorted ascending and carries
/// `left`'s measurement columns followed by `right`'s. Shared measurement names are rejected;
/// rename through the source schema before joining.
pub fn join(left: &DatedSeries, right: &DatedSeries) -> Result<DatedSeries> {
    let right_columns = right.measurement_columns();
    if let Some(column) = left
        .measurement_columns()
        .into_iter()
        .find(|column| right_columns.contains(column))
    {
        return Err(AnalysisError::ColumnCollision {
            left: left.name().to_string(),
            right: right.name().to_string(),
            column,
        });
    }

    let joined = left
        .frame()
        .clone()
        .lazy()
        .join(
            right.frame().clone().lazy(),
            [col(DATE_COLUMN)],
            [col(DATE_COLUMN)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([DATE_COLUMN], SortMultipleOptions::default())
        .collect()?;

    debug!(
        left = left.name(),
        right = right.name(),
        left_rows = left.height(),
        right_rows = right.height(),
        joined_rows = joined.height(),
        "inner join on date"
    );

    let name = format!("{}+{}", left.name(), right.name());
    Ok(DatedSeries::new(name, joined)?)
}
