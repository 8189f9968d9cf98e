use anyhow::Result;
use ruonia_core::config::{AnalysisConfig, ConfigError, OutputFormat};
use ruonia_parser::ColumnKind;

#[test]
fn empty_config_uses_defaults() -> Result<()> {
    let config = AnalysisConfig::from_toml_str("")?;

    assert_eq!(config, AnalysisConfig::default());
    assert_eq!(config.output, OutputFormat::Table);
    assert_eq!(config.short_window, 7);
    assert_eq!(config.long_window, 30);
    assert_eq!(config.volatility_window, 30);
    assert_eq!(config.rate_bins, 30);
    assert_eq!(config.change_bins, 40);
    Ok(())
}

#[test]
fn toml_overrides_windows_and_sources() -> Result<()> {
    let config = AnalysisConfig::from_toml_str(
        r#"
output = "json"
short_window = 5
volatility_window = 10

[sources.usd_rub]
date_format = "%d.%m.%Y"
column_map = { "Close" = "price" }

[[sources.ruonia.columns]]
name = "volume"
required = true

[[sources.ruonia.columns]]
name = "spread"
kind = "percent"
"#,
    )?;

    assert_eq!(config.output, OutputFormat::Json);
    assert_eq!(config.short_window, 5);
    assert_eq!(config.long_window, 30);
    assert_eq!(config.volatility_window, 10);

    let usd_rub = config.schema_for("usd_rub")?;
    assert_eq!(usd_rub.date_format, "%d.%m.%Y");
    assert_eq!(usd_rub.semantic_name("Close"), "price");
    assert_eq!(usd_rub.semantic_name("Price"), "price");

    let ruonia = config.schema_for("ruonia")?;
    assert_eq!(ruonia.date_format, "%Y-%m-%d");
    assert!(ruonia.column("volume").map(|spec| spec.required).unwrap_or(false));
    assert_eq!(
        ruonia.column("spread").map(|spec| spec.kind),
        Some(ColumnKind::Percent)
    );
    Ok(())
}

#[test]
fn unknown_source_is_a_config_error() {
    let err = AnalysisConfig::default().schema_for("libor").unwrap_err();
    assert!(matches!(err, ConfigError::Source(_)));
}

#[test]
fn malformed_toml_is_rejected() {
    let err = AnalysisConfig::from_toml_str("short_window = \"seven\"").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn missing_config_file_reports_path() {
    let err = AnalysisConfig::from_path("/definitely/not/here.toml").unwrap_err();
    match err {
        ConfigError::Io { path, .. } => assert!(path.ends_with("here.toml")),
        other => panic!("expected Io error, got {other:?}"),
    }
}
