use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ruonia_parser::{source_schema, ColumnSpec, LoadError, SourceSchema};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Source(#[from] LoadError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Adjustments applied on top of a built-in source schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourceOverride {
    pub date_format: Option<String>,
    #[serde(default)]
    pub column_map: BTreeMap<String, String>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub output: OutputFormat,
    pub short_window: usize,
    pub long_window: usize,
    pub volatility_window: usize,
    pub rate_bins: usize,
    pub change_bins: usize,
    pub sources: BTreeMap<String, SourceOverride>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::Table,
            short_window: 7,
            long_window: 30,
            volatility_window: 30,
            rate_bins: 30,
            change_bins: 40,
            sources: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
        Self::from_toml_str(&content)
    }

    /// Built-in schema for `name` with any configured override applied.
    pub fn schema_for(&self, name: &str) -> Result<SourceSchema, ConfigError> {
        let mut schema = source_schema(name)?;
        let Some(overrides) = self.sources.get(schema.name.as_str()) else {
            return Ok(schema);
        };

        if let Some(format) = &overrides.date_format {
            schema.date_format = format.clone();
        }
        for (raw, semantic) in &overrides.column_map {
            schema.column_map.insert(raw.clone(), semantic.clone());
        }
        for spec in &overrides.columns {
            match schema.columns.iter_mut().find(|existing| existing.name == spec.name) {
                Some(existing) => *existing = spec.clone(),
                None => schema.columns.push(spec.clone()),
            }
        }
        Ok(schema)
    }
}
