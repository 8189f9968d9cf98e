use crate::model::{ColumnSpec, SourceSchema};
use crate::registry::SourceFormat;

use super::schema::*;

/// Bank of Russia RUONIA export (`DT,ruo,vol,T,C,MinRate,Percentile25,Percentile75,MaxRate,StatusXML`).
pub struct RuoniaFormat;

impl RuoniaFormat {
    pub const NAME: &'static str = "ruonia";
    const DATE_FORMAT: &'static str = "%Y-%m-%d";
}

impl SourceFormat for RuoniaFormat {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "RUONIA overnight rate history with volume, counts, min/max and percentiles"
    }

    fn schema(&self) -> SourceSchema {
        SourceSchema::new(Self::NAME, Self::DATE_FORMAT)
            .with_mapping("DT", DATE)
            .with_mapping("ruo", RATE)
            .with_mapping("vol", VOLUME)
            .with_mapping("T", TRANSACTION_COUNT)
            .with_mapping("C", PARTICIPANT_COUNT)
            .with_mapping("MinRate", MIN_RATE)
            .with_mapping("MaxRate", MAX_RATE)
            .with_mapping("Percentile25", PERCENTILE_25)
            .with_mapping("Percentile75", PERCENTILE_75)
            .with_mapping("StatusXML", STATUS)
            .with_column(ColumnSpec::required(RATE))
            .with_column(ColumnSpec::optional(VOLUME))
            .with_column(ColumnSpec::optional(TRANSACTION_COUNT))
            .with_column(ColumnSpec::optional(PARTICIPANT_COUNT))
            .with_column(ColumnSpec::optional(MIN_RATE))
            .with_column(ColumnSpec::optional(PERCENTILE_25))
            .with_column(ColumnSpec::optional(PERCENTILE_75))
            .with_column(ColumnSpec::optional(MAX_RATE))
            .with_column(ColumnSpec::optional(STATUS))
    }
}
