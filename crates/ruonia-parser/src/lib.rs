pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::LoadError;
pub use formats::schema as columns;
pub use formats::{coerce_cell, coerce_numeric, coerce_percent, parse_date};
pub use model::{
    ColumnKind, ColumnSpec, DatedSeries, SourceSchema, DATE_COLUMN, NORMALIZED_DATE_FORMAT,
};
pub use registry::{
    all_source_formats, load_series, load_series_from_path, load_series_from_str, source_schema,
    SourceFormat,
};

#[cfg(test)]
mod tests;
