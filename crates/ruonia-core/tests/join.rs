use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use ruonia_core::join::join;
use ruonia_core::AnalysisError;
use ruonia_parser::{load_series_from_path, source_schema, DatedSeries};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../ruonia-parser/tests/data")
        .join(name)
}

fn load(source: &str, file: &str) -> Result<DatedSeries> {
    let schema = source_schema(source)?;
    Ok(load_series_from_path(fixture_path(file), &schema)?)
}

#[test]
fn join_keeps_only_shared_dates() -> Result<()> {
    let ruonia = load("ruonia", "ruonia_sample.csv")?;
    let usd_rub = load("usd_rub", "usd_rub_sample.csv")?;

    let joined = join(&ruonia, &usd_rub)?;

    assert_eq!(joined.height(), 6);
    assert!(joined.height() <= ruonia.height().min(usd_rub.height()));

    let left: HashSet<NaiveDate> = ruonia.dates()?.into_iter().collect();
    let right: HashSet<NaiveDate> = usd_rub.dates()?.into_iter().collect();
    let dates = joined.dates()?;
    assert!(dates.iter().all(|date| left.contains(date) && right.contains(date)));
    assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 9, 20).unwrap());

    let mut expected = ruonia.measurement_columns();
    expected.extend(usd_rub.measurement_columns());
    assert_eq!(joined.measurement_columns(), expected);
    Ok(())
}

#[test]
fn join_carries_values_from_both_sides() -> Result<()> {
    let ruonia = load("ruonia", "ruonia_sample.csv")?;
    let usd_rub = load("usd_rub", "usd_rub_sample.csv")?;

    let joined = join(&ruonia, &usd_rub)?;

    assert_eq!(joined.values("rate")?[0], Some(18.90));
    assert_eq!(joined.values("price")?[0], Some(92.5));
    assert_eq!(joined.values("min_rate")?[0], None);
    Ok(())
}

#[test]
fn join_rejects_colliding_measurements() -> Result<()> {
    let ruonia = load("ruonia", "ruonia_sample.csv")?;

    let err = join(&ruonia, &ruonia.renamed("copy")).unwrap_err();

    match err {
        AnalysisError::ColumnCollision { column, .. } => assert_eq!(column, "rate"),
        other => panic!("expected ColumnCollision, got {other:?}"),
    }
    Ok(())
}

#[test]
fn join_without_overlap_is_empty() -> Result<()> {
    let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
    let a = DatedSeries::from_columns("a", &[day(1), day(2)], vec![("x".into(), vec![Some(1.0), Some(2.0)])])?;
    let b = DatedSeries::from_columns("b", &[day(3), day(4)], vec![("y".into(), vec![Some(3.0), None])])?;

    let joined = join(&a, &b)?;

    assert!(joined.is_empty());
    assert_eq!(joined.measurement_columns(), vec!["x".to_string(), "y".to_string()]);
    Ok(())
}
