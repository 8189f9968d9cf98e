use std::io::Write;

use ruonia_parser::{DatedSeries, DATE_COLUMN, NORMALIZED_DATE_FORMAT};

use crate::error::Result;

/// Writes the normalized table as CSV: `date` first, missing cells empty.
///
/// Floats use Rust's shortest round-trip formatting, so reloading with
/// [`ruonia_parser::SourceSchema::normalized`] reproduces every present value exactly.
pub fn write_csv<W: Write>(series: &DatedSeries, writer: W) -> Result<()> {
    let columns = series.measurement_columns();
    let dates = series.dates()?;
    let data = columns
        .iter()
        .map(|column| series.values(column))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut writer = csv::Writer::from_writer(writer);
    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push(DATE_COLUMN);
    header.extend(columns.iter().map(String::as_str));
    writer.write_record(&header)?;

    for (row, date) in dates.iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(date.format(NORMALIZED_DATE_FORMAT).to_string());
        for values in &data {
            record.push(values[row].map(|v| v.to_string()).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn to_csv_string(series: &DatedSeries) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(series, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
