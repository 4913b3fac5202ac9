//! Error types for the league client

use thiserror::Error;

/// Result type alias for league client operations
pub type Result<T> = std::result::Result<T, LeagueClientError>;

#[derive(Error, Debug)]
pub enum LeagueClientError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("League API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("League API error: {message}")]
    Api { message: String },

    #[error("Unexpected league response: {message}")]
    Schema { message: String },
}

impl LeagueClientError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig { message: msg.into() }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema { message: msg.into() }
    }

    /// Whether retrying the same request could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            LeagueClientError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map(|s| s.is_server_error() || s.as_u16() == 429).unwrap_or(false)
            }
            LeagueClientError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let unavailable = LeagueClientError::Status { status: 503, body: String::new() };
        assert!(unavailable.is_transient());

        let throttled = LeagueClientError::Status { status: 429, body: String::new() };
        assert!(throttled.is_transient());

        let forbidden = LeagueClientError::Status { status: 403, body: "login".to_string() };
        assert!(!forbidden.is_transient());

        assert!(!LeagueClientError::schema("missing tables").is_transient());
        assert!(!LeagueClientError::invalid_config("LEAGUE_ID not set").is_transient());
    }
}
