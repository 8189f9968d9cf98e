use crate::model::{ColumnSpec, SourceSchema};
use crate::registry::SourceFormat;

use super::schema::*;

/// Investing.com-style daily history (`Date,Price,Open,High,Low,Vol.,Change %`), newest first.
pub struct UsdRubFormat;

impl UsdRubFormat {
    pub const NAME: &'static str = "usd_rub";
    const DATE_FORMAT: &'static str = "%m/%d/%y";
}

impl SourceFormat for UsdRubFormat {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "USD/RUB daily close with open/high/low and percent change"
    }

    fn schema(&self) -> SourceSchema {
        // `Vol.` is left unmapped; the export leaves it blank for this pair.
        SourceSchema::new(Self::NAME, Self::DATE_FORMAT)
            .with_mapping("Date", DATE)
            .with_mapping("Price", PRICE)
            .with_mapping("Open", OPEN)
            .with_mapping("High", HIGH)
            .with_mapping("Low", LOW)
            .with_mapping("Change %", CHANGE_PCT)
            .with_column(ColumnSpec::required(PRICE))
            .with_column(ColumnSpec::optional(OPEN))
            .with_column(ColumnSpec::optional(HIGH))
            .with_column(ColumnSpec::optional(LOW))
            .with_column(ColumnSpec::optional(CHANGE_PCT).percent())
    }
}
