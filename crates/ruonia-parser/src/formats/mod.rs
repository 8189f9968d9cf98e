mod common;
mod ruonia;
pub mod schema;
mod usd_rub;

pub use common::{coerce_cell, coerce_numeric, coerce_percent, parse_date};
pub use ruonia::RuoniaFormat;
pub use usd_rub::UsdRubFormat;

pub(crate) use common::read_delimited;
