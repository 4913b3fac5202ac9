//! Public stats service: cached refresh, player search, comparison and team strength

use crate::cache::{CacheEntry, CacheStore};
use crate::config::MAX_CACHE_TTL_SECS;
use crate::elo::EloProvider;
use crate::error::Result;
use crate::models::{StatsRow, TeamElo};
use crate::provider::StatsProvider;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

const PLAYERS_CACHE: &str = "players";
const ELO_CACHE: &str = "elo";

/// Result of a refresh request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// True when the cached tables were still fresh and nothing was fetched
    pub cached: bool,

    /// Number of player rows now cached (absent when served from cache)
    pub rows: Option<usize>,
}

/// Filters for a player search
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerQuery {
    pub q: String,
    pub team: String,
    pub position: String,
    pub limit: usize,
}

impl Default for PlayerQuery {
    fn default() -> Self {
        Self { q: String::new(), team: String::new(), position: String::new(), limit: 50 }
    }
}

/// Cached public stats for search/compare/matchup endpoints
pub struct StatsService {
    players: Arc<dyn StatsProvider>,
    elo: Arc<dyn EloProvider>,
    cache: CacheStore,
    ttl: Duration,
    refresh_lock: Mutex<()>,
}

impl StatsService {
    pub fn new(
        players: Arc<dyn StatsProvider>,
        elo: Arc<dyn EloProvider>,
        cache: CacheStore,
        ttl_secs: u64,
    ) -> Self {
        Self {
            players,
            elo,
            cache,
            ttl: Duration::seconds(ttl_secs.min(MAX_CACHE_TTL_SECS) as i64),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Pull and cache player stats and team ratings unless the cache is still fresh
    pub async fn refresh(&self, force: bool) -> Result<RefreshOutcome> {
        let _guard = self.refresh_lock.lock().await;

        if !force {
            if let Some(entry) = self.cache.read::<StatsRow>(PLAYERS_CACHE).await? {
                if entry.is_fresh(Utc::now()) {
                    info!("Stats cache fresh until {}, skipping refresh", entry.expires_at);
                    return Ok(RefreshOutcome { cached: true, rows: None });
                }
            }
        }

        let players = self.players.fetch_season_stats().await?;
        let ratings = self.elo.fetch_team_ratings().await?;

        let now = Utc::now();
        let rows = players.len();
        self.cache.write(PLAYERS_CACHE, &CacheEntry::new(players, self.ttl, now)).await?;
        self.cache.write(ELO_CACHE, &CacheEntry::new(ratings, self.ttl, now)).await?;

        info!("Refreshed stats cache with {} players", rows);
        Ok(RefreshOutcome { cached: false, rows: Some(rows) })
    }

    /// Cached tables, fetching them first if either is missing
    pub async fn ensure_data(&self) -> Result<(Vec<StatsRow>, Vec<TeamElo>)> {
        let players = self.cache.read::<StatsRow>(PLAYERS_CACHE).await?;
        let ratings = self.cache.read::<TeamElo>(ELO_CACHE).await?;
        if let (Some(players), Some(ratings)) = (players, ratings) {
            return Ok((players.rows, ratings.rows));
        }

        self.refresh(true).await?;
        let players = self.cache.read::<StatsRow>(PLAYERS_CACHE).await?.map(|e| e.rows).unwrap_or_default();
        let ratings = self.cache.read::<TeamElo>(ELO_CACHE).await?.map(|e| e.rows).unwrap_or_default();
        Ok((players, ratings))
    }

    pub async fn search_players(&self, query: &PlayerQuery) -> Result<Vec<StatsRow>> {
        let (players, _) = self.ensure_data().await?;
        Ok(search_rows(players, query))
    }

    pub async fn compare_players(&self, names: &[String]) -> Result<Vec<StatsRow>> {
        let (players, _) = self.ensure_data().await?;
        Ok(compare_rows(players, names))
    }

    /// Team strength table, strongest first
    pub async fn matchup_table(&self) -> Result<Vec<TeamElo>> {
        let (_, mut ratings) = self.ensure_data().await?;
        ratings.sort_by(|a, b| b.elo.partial_cmp(&a.elo).unwrap_or(Ordering::Equal).then_with(|| a.team.cmp(&b.team)));
        Ok(ratings)
    }
}

/// Filter and rank player rows for a search
pub fn search_rows(rows: Vec<StatsRow>, query: &PlayerQuery) -> Vec<StatsRow> {
    let q = query.q.trim().to_lowercase();

    let mut found: Vec<StatsRow> = rows
        .into_iter()
        .filter(|row| q.is_empty() || row.player_name.to_lowercase().contains(&q))
        .filter(|row| query.team.is_empty() || row.team_name.as_deref() == Some(query.team.as_str()))
        .filter(|row| {
            query.position.is_empty()
                || row.position.as_deref().map(|p| p.contains(query.position.as_str())).unwrap_or(false)
        })
        .collect();

    found.sort_by(|a, b| {
        let key = |r: &StatsRow| {
            [r.xg, r.xa, r.shots_total, r.key_passes].map(|v| v.unwrap_or(0.0))
        };
        let (ka, kb) = (key(a), key(b));
        ka.iter()
            .zip(kb.iter())
            .map(|(x, y)| y.partial_cmp(x).unwrap_or(Ordering::Equal))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.player_name.cmp(&b.player_name))
    });
    found.truncate(query.limit);
    found
}

/// Rows for the named players, ordered by name
pub fn compare_rows(rows: Vec<StatsRow>, names: &[String]) -> Vec<StatsRow> {
    let mut found: Vec<StatsRow> = rows.into_iter().filter(|row| names.contains(&row.player_name)).collect();
    found.sort_by(|a, b| a.player_name.cmp(&b.player_name));
    found
}
