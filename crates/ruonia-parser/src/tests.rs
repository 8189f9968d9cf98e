use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::columns::{CHANGE_PCT, MIN_RATE, PRICE, RATE, RUONIA_COLUMNS, USD_RUB_COLUMNS, VOLUME};
use crate::errors::LoadError;
use crate::formats::{coerce_numeric, coerce_percent, parse_date};
use crate::model::{ColumnKind, ColumnSpec, DatedSeries, SourceSchema, DATE_COLUMN};
use crate::{load_series, load_series_from_path, load_series_from_str, source_schema};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn fixture(name: &str) -> String {
    let full_path = fixture_path(name);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn loads_ruonia_fixture_with_renamed_columns() {
    let schema = source_schema("ruonia").expect("ruonia schema");
    let series = load_series_from_path(fixture_path("ruonia_sample.csv"), &schema)
        .expect("ruonia load failed");

    assert_eq!(series.height(), 10);
    assert_eq!(series.measurement_columns(), RUONIA_COLUMNS);
    assert_eq!(series.frame().get_column_names()[0].as_str(), DATE_COLUMN);

    let dates = series.dates().unwrap();
    assert_eq!(dates.first(), Some(&date(2024, 9, 16)));
    assert_eq!(dates.last(), Some(&date(2024, 9, 27)));

    let rates = series.values(RATE).unwrap();
    assert_eq!(rates[0], Some(18.95));
    assert!(rates.iter().all(Option::is_some));
}

#[test]
fn non_numeric_cells_become_missing() {
    let schema = source_schema("ruonia").unwrap();
    let series = load_series_from_str(&fixture("ruonia_sample.csv"), &schema).unwrap();

    let volume = series.values(VOLUME).unwrap();
    assert_eq!(volume[3], None, "'n/a' should coerce to missing");
    assert_eq!(volume[2], Some(295.0));

    let min_rate = series.values(MIN_RATE).unwrap();
    assert_eq!(min_rate[4], None, "empty cell should coerce to missing");
}

#[test]
fn usd_rub_fixture_is_sorted_ascending_and_percent_stripped() {
    let schema = source_schema("usd_rub").unwrap();
    let series = load_series_from_str(&fixture("usd_rub_sample.csv"), &schema).unwrap();

    assert_eq!(series.measurement_columns(), USD_RUB_COLUMNS);
    let dates = series.dates().unwrap();
    assert_eq!(dates.first(), Some(&date(2024, 9, 20)));
    assert_eq!(dates.last(), Some(&date(2024, 10, 2)));
    assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));

    let prices = series.values(PRICE).unwrap();
    assert_eq!(prices[0], Some(92.5));
    assert_eq!(prices.last().copied().flatten(), Some(95.25));

    let change = series.values(CHANGE_PCT).unwrap();
    assert_eq!(change[0], Some(0.76));
    assert_eq!(change[1], Some(-0.22));
}

#[test]
fn unparsable_date_reports_row_index() {
    let schema = source_schema("ruonia").unwrap();
    let content = "DT,ruo\n2024-01-09,16.0\n2024-01-10,16.1\n10/01/2024,16.2\n";
    let err = load_series_from_str(content, &schema).unwrap_err();

    match err {
        LoadError::MalformedInput { row_index, .. } => assert_eq!(row_index, 2),
        other => panic!("expected MalformedInput, got {other:?}"),
    }
}

#[test]
fn bad_numeric_cells_never_raise() {
    let schema = source_schema("ruonia").unwrap();
    let content = "DT,ruo,vol\n2024-01-09,abc,1e400\n2024-01-10,NaN,\n2024-01-11,16.2,  7 \n";
    let series = load_series_from_str(content, &schema).expect("coercion must not fail");

    assert_eq!(series.values(RATE).unwrap(), vec![None, None, Some(16.2)]);
    assert_eq!(series.values(VOLUME).unwrap(), vec![None, None, Some(7.0)]);
}

#[test]
fn missing_required_column_is_a_schema_error() {
    let schema = source_schema("usd_rub").unwrap();
    let content = "Date,Open\n01/09/24,90.1\n";
    let err = load_series_from_str(content, &schema).unwrap_err();

    match err {
        LoadError::Schema { column, .. } => assert_eq!(column, PRICE),
        other => panic!("expected Schema error, got {other:?}"),
    }
}

#[test]
fn missing_date_column_is_a_schema_error() {
    let schema = source_schema("ruonia").unwrap();
    let err = load_series_from_str("Day,ruo\n2024-01-09,16.0\n", &schema).unwrap_err();

    match err {
        LoadError::Schema { column, .. } => assert_eq!(column, DATE_COLUMN),
        other => panic!("expected Schema error, got {other:?}"),
    }
}

#[test]
fn optional_columns_may_be_absent() {
    let schema = source_schema("ruonia").unwrap();
    let series = load_series_from_str("DT,ruo\n2024-01-09,16.0\n", &schema).unwrap();

    assert_eq!(series.measurement_columns(), vec![RATE.to_string()]);
    assert!(!series.has_column(VOLUME));
}

#[test]
fn duplicate_dates_are_rejected() {
    let schema = source_schema("ruonia").unwrap();
    let content = "DT,ruo\n2024-01-09,16.0\n2024-01-10,16.1\n2024-01-09,16.2\n";
    let err = load_series_from_str(content, &schema).unwrap_err();

    assert_eq!(err.row_index(), Some(2));
}

#[test]
fn unreadable_source_is_reported() {
    let schema = source_schema("ruonia").unwrap();
    let err = load_series_from_path(fixture_path("does_not_exist.csv"), &schema).unwrap_err();

    assert!(matches!(err, LoadError::SourceUnavailable { .. }));
}

#[test]
fn directory_source_is_unavailable() {
    let schema = source_schema("ruonia").unwrap();
    let data_dir = fixture_path("");
    let err = load_series_from_path(&data_dir, &schema).unwrap_err();

    match err {
        LoadError::SourceUnavailable { path, .. } => assert_eq!(path, data_dir),
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("device went away"))
    }
}

#[test]
fn read_failure_mid_stream_is_unavailable() {
    let schema = source_schema("usd_rub").unwrap();
    let err = load_series(FailingReader, &schema).unwrap_err();

    match err {
        LoadError::SourceUnavailable { path, source } => {
            assert_eq!(path, PathBuf::from("usd_rub"));
            assert_eq!(source.to_string(), "device went away");
        }
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
}

#[test]
fn repeated_header_keeps_first_column() {
    let schema = source_schema("ruonia").unwrap();
    let content = "DT,ruo,ruo\n2024-01-09,16.0,99.0\n2024-01-10,16.1,98.0\n";
    let series = load_series_from_str(content, &schema).unwrap();

    assert_eq!(series.measurement_columns(), vec![RATE.to_string()]);
    assert_eq!(series.values(RATE).unwrap(), vec![Some(16.0), Some(16.1)]);
}

#[test]
fn unknown_source_lists_known_names() {
    let err = source_schema("libor").unwrap_err();

    match err {
        LoadError::UnknownSource { known, .. } => {
            assert_eq!(known, vec!["ruonia", "usd_rub"]);
        }
        other => panic!("expected UnknownSource, got {other:?}"),
    }
}

#[test]
fn custom_schema_renames_and_declares_percent_columns() {
    let schema = SourceSchema::new("custom", "%d.%m.%Y")
        .with_mapping("Day", DATE_COLUMN)
        .with_mapping("Yield", "yield")
        .with_column(ColumnSpec::required("yield").percent());
    assert_eq!(schema.column("yield").map(|spec| spec.kind), Some(ColumnKind::Percent));

    let content = "Day,Yield,Comment\n02.01.2024,4.5%,a\n03.01.2024,bad%,b\n";
    let series = load_series(content.as_bytes(), &schema).unwrap();

    assert_eq!(series.measurement_columns(), vec!["yield".to_string()]);
    assert_eq!(series.values("yield").unwrap(), vec![Some(4.5), None]);
    assert_eq!(series.dates().unwrap(), vec![date(2024, 1, 2), date(2024, 1, 3)]);
}

#[test]
fn date_time_formats_truncate_to_calendar_day() {
    let schema = SourceSchema::new("intraday", "%Y-%m-%dT%H:%M:%S")
        .with_mapping("DT", DATE_COLUMN)
        .with_column(ColumnSpec::required("rate"));
    let content = "DT,rate\n2024-01-09T00:00:00,16.0\n2024-01-10T00:00:00,16.1\n";
    let series = load_series_from_str(content, &schema).unwrap();

    assert_eq!(series.dates().unwrap(), vec![date(2024, 1, 9), date(2024, 1, 10)]);
}

#[test]
fn coercion_policy_is_explicit() {
    assert_eq!(coerce_numeric(" 12.5 "), Some(12.5));
    assert_eq!(coerce_numeric(""), None);
    assert_eq!(coerce_numeric("nan"), None);
    assert_eq!(coerce_numeric("inf"), None);
    assert_eq!(coerce_numeric("1,234"), None);
    assert_eq!(coerce_percent("-0.35%"), Some(-0.35));
    assert_eq!(coerce_percent("0.35"), Some(0.35));
    assert_eq!(coerce_percent("%"), None);
}

#[test]
fn parse_date_uses_declared_format_only() {
    assert_eq!(parse_date("01/03/22", "%m/%d/%y"), Some(date(2022, 1, 3)));
    assert_eq!(parse_date("2022-01-03", "%m/%d/%y"), None);
    assert_eq!(parse_date(" 2022-01-03 ", "%Y-%m-%d"), Some(date(2022, 1, 3)));
}

#[test]
fn dated_series_rejects_unordered_dates() {
    let err = DatedSeries::from_columns(
        "manual",
        &[date(2024, 1, 2), date(2024, 1, 1)],
        vec![("x".to_string(), vec![Some(1.0), Some(2.0)])],
    )
    .unwrap_err();

    assert!(matches!(err, LoadError::Validation { .. }));
}

#[test]
fn with_column_appends_without_mutating_input() {
    let series = DatedSeries::from_columns(
        "manual",
        &[date(2024, 1, 1), date(2024, 1, 2)],
        vec![("x".to_string(), vec![Some(1.0), Some(2.0)])],
    )
    .unwrap();

    let extended = series.with_column("y", vec![None, Some(3.0)]).unwrap();

    assert_eq!(series.measurement_columns(), vec!["x".to_string()]);
    assert_eq!(
        extended.measurement_columns(),
        vec!["x".to_string(), "y".to_string()]
    );
    assert_eq!(extended.values("y").unwrap(), vec![None, Some(3.0)]);
}
