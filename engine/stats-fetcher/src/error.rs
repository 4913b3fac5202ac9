//! Error types for the stats fetcher

use thiserror::Error;

/// Result type alias for stats operations
pub type Result<T> = std::result::Result<T, StatsError>;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stats source returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected stats table: {message}")]
    Schema { message: String },
}

impl StatsError {
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema { message: msg.into() }
    }

    /// Whether retrying the same fetch could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            StatsError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map(|s| s.is_server_error() || s.as_u16() == 429).unwrap_or(false)
            }
            StatsError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
