//! Configuration for the stats fetcher

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Longest cache lifetime accepted (one year)
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Stats provider and cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// URL or file path of the player season stats table.
    /// `{season}` and `{competition}` are substituted.
    pub source: String,

    /// Season label (e.g. "2025-2026")
    pub season: String,

    /// Competition label (e.g. "ENG-Premier League")
    pub competition: String,

    /// Directory holding the public stats cache
    pub cache_dir: PathBuf,

    /// How long a cached refresh stays fresh
    pub cache_ttl_secs: u64,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// ClubElo team ratings
    pub elo: EloConfig,
}

/// ClubElo configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EloConfig {
    pub base_url: String,

    /// Country code to keep (e.g. "ENG")
    pub country: String,

    /// League level to keep (1 = top flight)
    pub level: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            source: "data/fbref/{competition}_{season}.csv".to_string(),
            season: "2025-2026".to_string(),
            competition: "ENG-Premier League".to_string(),
            cache_dir: PathBuf::from("data/cache"),
            cache_ttl_secs: 300,
            request_timeout_secs: 30,
            elo: EloConfig::default(),
        }
    }
}

impl Default for EloConfig {
    fn default() -> Self {
        Self { base_url: "http://api.clubelo.com".to_string(), country: "ENG".to_string(), level: 1 }
    }
}

impl StatsConfig {
    /// The stats source with placeholders filled in
    pub fn resolved_source(&self) -> String {
        self.source.replace("{season}", &self.season).replace("{competition}", &self.competition)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.source.trim().is_empty() {
            return Err("stats source must not be empty".to_string());
        }

        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(format!(
                "cache_ttl_secs {} exceeds the maximum of {}",
                self.cache_ttl_secs, MAX_CACHE_TTL_SECS
            ));
        }

        Ok(())
    }
}
