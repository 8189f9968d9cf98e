use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use ruonia_parser::columns::{
    CHANGE_PCT, MAX_RATE, MIN_RATE, PARTICIPANT_COUNT, PERCENTILE_25, PERCENTILE_75, PRICE, RATE,
    TRANSACTION_COUNT, VOLUME,
};
use ruonia_parser::formats::{RuoniaFormat, UsdRubFormat};
use ruonia_parser::DatedSeries;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::correlation::{correlation_matrix, CorrelationMatrix};
use crate::error::{AnalysisError, Result};
use crate::join::join;
use crate::returns::percent_change;
use crate::rolling::{rolling_statistic, RollingKind};
use crate::summary::{histogram, summarize, ColumnSummary, HistogramBin};
use crate::types::{measurement, DatedValue};

/// Loaded sources keyed by source name (`ruonia`, `usd_rub`).
#[derive(Debug, Clone, Default)]
pub struct AnalysisInputs {
    sources: BTreeMap<String, DatedSeries>,
}

impl AnalysisInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, name: impl Into<String>, series: DatedSeries) -> Self {
        self.sources.insert(name.into(), series);
        self
    }

    pub fn get(&self, name: &str) -> Option<&DatedSeries> {
        self.sources.get(name)
    }

    fn require(&self, analysis: &'static str, name: &'static str) -> Result<&DatedSeries> {
        self.get(name).ok_or(AnalysisError::MissingSource {
            analysis,
            source_name: name,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingSeries {
    pub column: String,
    pub kind: RollingKind,
    pub window: usize,
    pub values: Vec<DatedValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandPoint {
    pub date: NaiveDate,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub lower_column: String,
    pub upper_column: String,
    pub points: Vec<BandPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuoniaOverview {
    pub rows: usize,
    pub rate: ColumnSummary,
    pub rate_histogram: Vec<HistogramBin>,
    pub rolling_means: Vec<RollingSeries>,
    pub min_max_band: Option<Band>,
    pub percentile_band: Option<Band>,
    pub volume: Option<ColumnSummary>,
    pub correlation: CorrelationMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsdRubOverview {
    pub rows: usize,
    pub price: ColumnSummary,
    pub change: Option<ColumnSummary>,
    pub change_histogram: Vec<HistogramBin>,
    pub rolling_means: Vec<RollingSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayPoint {
    pub date: NaiveDate,
    pub rate: Option<f64>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedOverview {
    pub ruonia_rows: usize,
    pub usd_rub_rows: usize,
    pub joined_rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub overlay: Vec<OverlayPoint>,
    pub correlation: CorrelationMatrix,
    pub returns: Vec<DatedValue>,
    pub volatility: Option<RollingSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "analysis", rename_all = "snake_case")]
pub enum AnalysisReport {
    Ruonia(RuoniaOverview),
    UsdRub(UsdRubOverview),
    Combined(CombinedOverview),
}

pub trait Analysis: Send + Sync {
    fn code_identifier(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn required_sources(&self) -> &'static [&'static str];
    fn run(&self, inputs: &AnalysisInputs, config: &AnalysisConfig) -> Result<AnalysisReport>;
}

static ANALYSES: Lazy<Vec<&'static dyn Analysis>> = Lazy::new(|| {
    vec![
        &RuoniaAnalysis as &dyn Analysis,
        &UsdRubAnalysis as &dyn Analysis,
        &CombinedAnalysis as &dyn Analysis,
    ]
});

pub fn all_analyses() -> &'static [&'static dyn Analysis] {
    ANALYSES.as_slice()
}

pub fn find_analysis(code: &str) -> Option<&'static dyn Analysis> {
    all_analyses()
        .iter()
        .copied()
        .find(|analysis| analysis.code_identifier() == code)
}

struct RuoniaAnalysis;

impl Analysis for RuoniaAnalysis {
    fn code_identifier(&self) -> &'static str {
        "ruonia"
    }

    fn description(&self) -> &'static str {
        "RUONIA rate distribution, rolling averages, min/max and percentile bands"
    }

    fn required_sources(&self) -> &'static [&'static str] {
        &[RuoniaFormat::NAME]
    }

    fn run(&self, inputs: &AnalysisInputs, config: &AnalysisConfig) -> Result<AnalysisReport> {
        let series = inputs.require(self.code_identifier(), RuoniaFormat::NAME)?;
        ruonia_overview(series, config).map(AnalysisReport::Ruonia)
    }
}

struct UsdRubAnalysis;

impl Analysis for UsdRubAnalysis {
    fn code_identifier(&self) -> &'static str {
        "usd_rub"
    }

    fn description(&self) -> &'static str {
        "USD/RUB price trend, daily change distribution and rolling averages"
    }

    fn required_sources(&self) -> &'static [&'static str] {
        &[UsdRubFormat::NAME]
    }

    fn run(&self, inputs: &AnalysisInputs, config: &AnalysisConfig) -> Result<AnalysisReport> {
        let series = inputs.require(self.code_identifier(), UsdRubFormat::NAME)?;
        usd_rub_overview(series, config).map(AnalysisReport::UsdRub)
    }
}

struct CombinedAnalysis;

impl Analysis for CombinedAnalysis {
    fn code_identifier(&self) -> &'static str {
        "combined"
    }

    fn description(&self) -> &'static str {
        "RUONIA joined with USD/RUB: overlay, correlation, returns and volatility"
    }

    fn required_sources(&self) -> &'static [&'static str] {
        &[RuoniaFormat::NAME, UsdRubFormat::NAME]
    }

    fn run(&self, inputs: &AnalysisInputs, config: &AnalysisConfig) -> Result<AnalysisReport> {
        let ruonia = inputs.require(self.code_identifier(), RuoniaFormat::NAME)?;
        let usd_rub = inputs.require(self.code_identifier(), UsdRubFormat::NAME)?;
        combined_overview(ruonia, usd_rub, config).map(AnalysisReport::Combined)
    }
}

pub fn ruonia_overview(series: &DatedSeries, config: &AnalysisConfig) -> Result<RuoniaOverview> {
    info!(source = series.name(), rows = series.height(), "running ruonia overview");

    let rate = summarize(series, RATE)?;
    let rate_histogram = histogram(series, RATE, config.rate_bins)?;
    let rolling_means = rolling_means(series, RATE, config)?;
    let min_max_band = band(series, MIN_RATE, MAX_RATE)?;
    let percentile_band = band(series, PERCENTILE_25, PERCENTILE_75)?;
    let volume = if series.has_column(VOLUME) {
        Some(summarize(series, VOLUME)?)
    } else {
        None
    };
    let correlation = correlation_matrix(
        series,
        &present_columns(series, &[RATE, VOLUME, MIN_RATE, MAX_RATE]),
    )?;

    Ok(RuoniaOverview {
        rows: series.height(),
        rate,
        rate_histogram,
        rolling_means,
        min_max_band,
        percentile_band,
        volume,
        correlation,
    })
}

pub fn usd_rub_overview(series: &DatedSeries, config: &AnalysisConfig) -> Result<UsdRubOverview> {
    info!(source = series.name(), rows = series.height(), "running usd/rub overview");

    let price = summarize(series, PRICE)?;
    let (change, change_histogram) = if series.has_column(CHANGE_PCT) {
        (
            Some(summarize(series, CHANGE_PCT)?),
            histogram(series, CHANGE_PCT, config.change_bins)?,
        )
    } else {
        warn!(source = series.name(), column = CHANGE_PCT, "column absent, skipping histogram");
        (None, Vec::new())
    };
    let rolling_means = rolling_means(series, PRICE, config)?;

    Ok(UsdRubOverview {
        rows: series.height(),
        price,
        change,
        change_histogram,
        rolling_means,
    })
}

pub fn combined_overview(
    ruonia: &DatedSeries,
    usd_rub: &DatedSeries,
    config: &AnalysisConfig,
) -> Result<CombinedOverview> {
    info!(
        ruonia_rows = ruonia.height(),
        usd_rub_rows = usd_rub.height(),
        "running combined overview"
    );

    let joined = join(ruonia, usd_rub)?;
    let dates = joined.dates()?;

    let rates = measurement(&joined, RATE)?;
    let prices = measurement(&joined, PRICE)?;
    let overlay = dates
        .iter()
        .zip(rates.iter().zip(&prices))
        .map(|(date, (rate, price))| OverlayPoint {
            date: *date,
            rate: *rate,
            price: *price,
        })
        .collect();

    let correlation = correlation_matrix(
        &joined,
        &present_columns(
            &joined,
            &[RATE, VOLUME, TRANSACTION_COUNT, PARTICIPANT_COUNT, PRICE],
        ),
    )?;

    // Returns and volatility come from the full exchange-rate history, not the overlap.
    let returns = percent_change(usd_rub, PRICE)?;
    let volatility = if usd_rub.has_column(CHANGE_PCT) {
        Some(RollingSeries {
            column: CHANGE_PCT.to_string(),
            kind: RollingKind::StdDev,
            window: config.volatility_window,
            values: rolling_statistic(
                usd_rub,
                CHANGE_PCT,
                config.volatility_window,
                RollingKind::StdDev,
            )?,
        })
    } else {
        warn!(source = usd_rub.name(), column = CHANGE_PCT, "column absent, skipping volatility");
        None
    };

    info!(joined_rows = joined.height(), "combined overview complete");

    Ok(CombinedOverview {
        ruonia_rows: ruonia.height(),
        usd_rub_rows: usd_rub.height(),
        joined_rows: joined.height(),
        first_date: dates.first().copied(),
        last_date: dates.last().copied(),
        overlay,
        correlation,
        returns,
        volatility,
    })
}

fn rolling_means(
    series: &DatedSeries,
    column: &str,
    config: &AnalysisConfig,
) -> Result<Vec<RollingSeries>> {
    [config.short_window, config.long_window]
        .into_iter()
        .map(|window| {
            Ok(RollingSeries {
                column: column.to_string(),
                kind: RollingKind::Mean,
                window,
                values: rolling_statistic(series, column, window, RollingKind::Mean)?,
            })
        })
        .collect()
}

fn band(series: &DatedSeries, lower: &str, upper: &str) -> Result<Option<Band>> {
    if !(series.has_column(lower) && series.has_column(upper)) {
        return Ok(None);
    }
    let dates = series.dates()?;
    let lows = measurement(series, lower)?;
    let highs = measurement(series, upper)?;
    let points = dates
        .into_iter()
        .zip(lows.into_iter().zip(highs))
        .map(|(date, (lower, upper))| BandPoint { date, lower, upper })
        .collect();
    Ok(Some(Band {
        lower_column: lower.to_string(),
        upper_column: upper.to_string(),
        points,
    }))
}

fn present_columns<'a>(series: &DatedSeries, wanted: &[&'a str]) -> Vec<&'a str> {
    wanted
        .iter()
        .copied()
        .filter(|column| {
            let present = series.has_column(column);
            if !present {
                warn!(source = series.name(), column = *column, "correlation column absent");
            }
            present
        })
        .collect()
}
