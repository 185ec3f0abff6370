/// Rolling window defaults
pub const DEFAULT_WINDOW: usize = 30;
pub const MIN_WINDOW: usize = 2;

/// Two-sigma anomaly rule
pub const ANOMALY_SIGMA: f64 = 2.0;

/// Normal range half-width, in standard deviations
pub const NORMAL_RANGE_SIGMA: f64 = 2.0;

/// Assumed std when falling back to the reference table
pub const FALLBACK_STD: f64 = 5.0;

/// Decimal places reported in seasonal and descriptive tables
pub const STATS_DECIMALS: i32 = 2;

/// Dataset columns
pub const COLUMN_CITY: &str = "city";
pub const COLUMN_TIMESTAMP: &str = "timestamp";
pub const COLUMN_TEMPERATURE: &str = "temperature";
pub const REQUIRED_COLUMNS: [&str; 3] = [COLUMN_CITY, COLUMN_TIMESTAMP, COLUMN_TEMPERATURE];

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "TEMPMON";
