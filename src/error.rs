use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("City '{city}' has no records to analyze")]
    EmptySeries { city: String },

    #[error("Malformed record #{index} for city '{city}' ({}): {reason}", .timestamp.as_deref().unwrap_or("no timestamp"))]
    MalformedRecord {
        city: String,
        index: usize,
        timestamp: Option<String>,
        reason: String,
    },

    #[error("City '{city}' not found")]
    UnknownCity { city: String },

    #[error("Invalid timing measurement: sequential {sequential:.6}s, parallel {parallel:.6}s")]
    Timing { sequential: f64, parallel: f64 },

    #[error("Invalid rolling window size {0}: must be at least 2")]
    InvalidWindow(usize),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

