//! Configuration for the Fantrax client

use serde::{Deserialize, Serialize};

/// Fantrax API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FantraxConfig {
    /// Base URL of the Fantrax site
    pub api_base_url: String,

    /// League ID from the league URL
    pub league_id: String,

    /// Session cookie copied from a logged-in browser, sent verbatim
    pub session_cookie: Option<String>,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for FantraxConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.fantrax.com".to_string(),
            league_id: String::new(),
            session_cookie: None,
            request_timeout_secs: 30,
        }
    }
}

impl FantraxConfig {
    pub fn has_league_id(&self) -> bool {
        !self.league_id.trim().is_empty()
    }

    pub fn has_session_cookie(&self) -> bool {
        self.session_cookie.as_deref().map(|c| !c.trim().is_empty()).unwrap_or(false)
    }
}
