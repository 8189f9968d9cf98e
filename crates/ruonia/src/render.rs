use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use ruonia_core::analyses::{
    all_analyses, AnalysisReport, Band, CombinedOverview, RollingSeries, RuoniaOverview,
    UsdRubOverview,
};
use ruonia_core::config::OutputFormat;
use ruonia_core::correlation::CorrelationMatrix;
use ruonia_core::summary::{ColumnSummary, HistogramBin};
use ruonia_core::DatedValue;
use ruonia_parser::all_source_formats;

/// Rows shown for date-indexed sequences in table mode; JSON output carries everything.
const TAIL_ROWS: usize = 10;

pub fn render(report: &AnalysisReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Table => match report {
            AnalysisReport::Ruonia(overview) => render_ruonia(overview),
            AnalysisReport::UsdRub(overview) => render_usd_rub(overview),
            AnalysisReport::Combined(overview) => render_combined(overview),
        },
    }
    Ok(())
}

pub fn render_catalog() {
    let mut sources = new_table(vec!["source", "date format", "description"]);
    for format in all_source_formats() {
        sources.add_row(vec![
            format.name().to_string(),
            format.schema().date_format,
            format.description().to_string(),
        ]);
    }
    println!("{sources}");

    let mut analyses = new_table(vec!["analysis", "sources", "description"]);
    for analysis in all_analyses() {
        analyses.add_row(vec![
            analysis.code_identifier().to_string(),
            analysis.required_sources().join(", "),
            analysis.description().to_string(),
        ]);
    }
    println!("{analyses}");
}

fn render_ruonia(overview: &RuoniaOverview) {
    println!("RUONIA: {} rows", overview.rows);

    let mut summaries = vec![&overview.rate];
    summaries.extend(overview.volume.as_ref());
    println!("{}", summary_table(&summaries));
    println!("{}", rolling_table(&overview.rolling_means));

    for band in [&overview.min_max_band, &overview.percentile_band]
        .into_iter()
        .flatten()
    {
        println!("{}", band_table(band));
    }

    println!("Rate distribution");
    println!("{}", histogram_table(&overview.rate_histogram));
    println!("{}", correlation_table(&overview.correlation));
}

fn render_usd_rub(overview: &UsdRubOverview) {
    println!("USD/RUB: {} rows", overview.rows);

    let mut summaries = vec![&overview.price];
    summaries.extend(overview.change.as_ref());
    println!("{}", summary_table(&summaries));
    println!("{}", rolling_table(&overview.rolling_means));

    if !overview.change_histogram.is_empty() {
        println!("Daily change distribution (%)");
        println!("{}", histogram_table(&overview.change_histogram));
    }
}

fn render_combined(overview: &CombinedOverview) {
    println!(
        "Joined {} of {} RUONIA and {} USD/RUB rows ({} to {})",
        overview.joined_rows,
        overview.ruonia_rows,
        overview.usd_rub_rows,
        format_date(overview.first_date),
        format_date(overview.last_date),
    );

    let mut overlay = new_table(vec!["date", "rate", "price"]);
    for point in tail(&overview.overlay) {
        overlay.add_row(vec![
            point.date.to_string(),
            format_value(point.rate),
            format_value(point.price),
        ]);
    }
    println!("{overlay}");
    println!("{}", correlation_table(&overview.correlation));

    println!("USD/RUB daily returns");
    println!("{}", sequence_table("return", &overview.returns));
    if let Some(volatility) = &overview.volatility {
        println!("USD/RUB volatility ({}-row std of change %)", volatility.window);
        println!("{}", sequence_table("volatility", &volatility.values));
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn summary_table(summaries: &[&ColumnSummary]) -> Table {
    let mut table = new_table(vec![
        "column", "count", "missing", "mean", "std", "min", "max", "first", "last",
    ]);
    for summary in summaries {
        table.add_row(vec![
            summary.column.clone(),
            summary.count.to_string(),
            summary.missing.to_string(),
            format_value(summary.mean),
            format_value(summary.std),
            format_value(summary.min),
            format_value(summary.max),
            format_date(summary.first_date),
            format_date(summary.last_date),
        ]);
    }
    table
}

fn rolling_table(rolling: &[RollingSeries]) -> Table {
    let mut table = new_table(vec!["column", "statistic", "window", "date", "latest"]);
    for series in rolling {
        let latest = series.values.iter().rev().find(|entry| entry.value.is_some());
        table.add_row(vec![
            series.column.clone(),
            series.kind.as_str().to_string(),
            series.window.to_string(),
            format_date(latest.map(|entry| entry.date)),
            format_value(latest.and_then(|entry| entry.value)),
        ]);
    }
    table
}

fn band_table(band: &Band) -> Table {
    let mut table = new_table(vec!["date", band.lower_column.as_str(), band.upper_column.as_str()]);
    for point in tail(&band.points) {
        table.add_row(vec![
            point.date.to_string(),
            format_value(point.lower),
            format_value(point.upper),
        ]);
    }
    table
}

fn histogram_table(bins: &[HistogramBin]) -> Table {
    let mut table = new_table(vec!["from", "to", "count"]);
    for bin in bins {
        table.add_row(vec![
            format!("{:.4}", bin.lower),
            format!("{:.4}", bin.upper),
            bin.count.to_string(),
        ]);
    }
    table
}

fn correlation_table(matrix: &CorrelationMatrix) -> Table {
    let mut header = vec![""];
    header.extend(matrix.columns().iter().map(String::as_str));
    let mut table = new_table(header);
    for (column, coefficients) in matrix.rows() {
        let mut row = vec![column.to_string()];
        row.extend(coefficients.iter().map(|value| format_value(*value)));
        table.add_row(row);
    }
    table
}

fn sequence_table(label: &str, values: &[DatedValue]) -> Table {
    let mut table = new_table(vec!["date", label]);
    for entry in tail(values) {
        table.add_row(vec![entry.date.to_string(), format_value(entry.value)]);
    }
    table
}

fn tail<T>(items: &[T]) -> &[T] {
    &items[items.len().saturating_sub(TAIL_ROWS)..]
}

fn format_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "-".to_string())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}
