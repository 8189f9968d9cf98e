use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::LoadError;
use crate::formats::{read_delimited, RuoniaFormat, UsdRubFormat};
use crate::model::{DatedSeries, SourceSchema};

pub trait SourceFormat {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn schema(&self) -> SourceSchema;
}

pub fn all_source_formats() -> [&'static dyn SourceFormat; 2] {
    [&RuoniaFormat, &UsdRubFormat]
}

/// Looks up a built-in schema by its source name.
pub fn source_schema(name: &str) -> Result<SourceSchema, LoadError> {
    let formats = all_source_formats();
    formats
        .iter()
        .find(|format| format.name().eq_ignore_ascii_case(name.trim()))
        .map(|format| format.schema())
        .ok_or_else(|| LoadError::UnknownSource {
            name: name.to_string(),
            known: formats.iter().map(|format| format.name()).collect(),
        })
}

/// Reads delimited rows from `reader` into a date-ordered series described by `schema`.
pub fn load_series<R: Read>(reader: R, schema: &SourceSchema) -> Result<DatedSeries, LoadError> {
    read_delimited(schema, reader, None)
}

pub fn load_series_from_str(content: &str, schema: &SourceSchema) -> Result<DatedSeries, LoadError> {
    read_delimited(schema, content.as_bytes(), None)
}

pub fn load_series_from_path(
    path: impl AsRef<Path>,
    schema: &SourceSchema,
) -> Result<DatedSeries, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| LoadError::SourceUnavailable {
        path: path.to_path_buf(),
        source: err,
    })?;
    read_delimited(schema, file, Some(path))
}
