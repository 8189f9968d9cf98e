//! Semantic column names produced by the built-in source schemas.

pub use crate::model::DATE_COLUMN as DATE;

pub const RATE: &str = "rate";
pub const VOLUME: &str = "volume";
pub const TRANSACTION_COUNT: &str = "transaction_count";
pub const PARTICIPANT_COUNT: &str = "participant_count";
pub const MIN_RATE: &str = "min_rate";
pub const MAX_RATE: &str = "max_rate";
pub const PERCENTILE_25: &str = "percentile_25";
pub const PERCENTILE_75: &str = "percentile_75";
pub const STATUS: &str = "status";

pub const PRICE: &str = "price";
pub const OPEN: &str = "open";
pub const HIGH: &str = "high";
pub const LOW: &str = "low";
pub const CHANGE_PCT: &str = "change_pct";

pub const RUONIA_COLUMNS: [&str; 9] = [
    RATE,
    VOLUME,
    TRANSACTION_COUNT,
    PARTICIPANT_COUNT,
    MIN_RATE,
    PERCENTILE_25,
    PERCENTILE_75,
    MAX_RATE,
    STATUS,
];

pub const USD_RUB_COLUMNS: [&str; 5] = [PRICE, OPEN, HIGH, LOW, CHANGE_PCT];
