//! Stats Fetcher
//!
//! Pulls season-long player statistics from an exported stats table and team
//! strength ratings from ClubElo, and keeps both in a file cache with explicit
//! expiry for the public stats endpoints.

pub mod cache;
pub mod config;
pub mod elo;
pub mod error;
pub mod models;
pub mod provider;
pub mod service;

pub use cache::{CacheEntry, CacheStore};
pub use config::{EloConfig, StatsConfig, MAX_CACHE_TTL_SECS};
pub use elo::{ClubEloProvider, EloProvider};
pub use error::{Result, StatsError};
pub use models::{StatsRow, TeamElo};
pub use provider::{StatsProvider, TableStatsProvider};
pub use service::{PlayerQuery, RefreshOutcome, StatsService};
