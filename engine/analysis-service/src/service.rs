//! Shared state behind the HTTP routes

use crate::config::ServiceConfig;
use crate::error::ApiError;
use analysis_pipeline::{AnalysisPipeline, PipelineConfig};
use anyhow::{Context, Result};
use league_client::{FantraxClient, FantraxConfig, LeagueClient, LeagueClientError};
use stats_fetcher::{CacheStore, ClubEloProvider, EloProvider, StatsProvider, StatsService, TableStatsProvider};
use std::sync::Arc;
use tracing::{info, warn};

/// Components the routes work with
pub struct ServiceState {
    pub api_key: Option<String>,
    pub fantrax: FantraxConfig,
    pub pipeline_config: PipelineConfig,
    pipeline: Option<Arc<AnalysisPipeline>>,
    pub stats: Arc<StatsService>,
}

impl ServiceState {
    /// Build live clients from configuration. A missing league id does not stop
    /// the service; league routes report it when called.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let stats_provider: Arc<dyn StatsProvider> =
            Arc::new(TableStatsProvider::new(&config.stats).context("Failed to create stats provider")?);
        let elo: Arc<dyn EloProvider> = Arc::new(
            ClubEloProvider::new(config.stats.elo.clone(), config.stats.request_timeout_secs)
                .context("Failed to create ClubElo provider")?,
        );

        let league: Option<Arc<dyn LeagueClient>> = match FantraxClient::new(config.fantrax.clone()) {
            Ok(client) => {
                info!("Fantrax client ready for league {}", client.league_id());
                Some(Arc::new(client))
            }
            Err(LeagueClientError::InvalidConfig { message }) => {
                warn!("League client disabled: {}", message);
                None
            }
            Err(e) => return Err(e).context("Failed to create Fantrax client"),
        };

        Ok(Self::new(
            config.auth.api_key.clone(),
            config.fantrax.clone(),
            config.pipeline.clone(),
            league,
            stats_provider,
            elo,
            CacheStore::new(config.stats.cache_dir.clone()),
            config.stats.cache_ttl_secs,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        api_key: Option<String>,
        fantrax: FantraxConfig,
        pipeline_config: PipelineConfig,
        league: Option<Arc<dyn LeagueClient>>,
        stats_provider: Arc<dyn StatsProvider>,
        elo: Arc<dyn EloProvider>,
        cache: CacheStore,
        cache_ttl_secs: u64,
    ) -> Self {
        let pipeline = league.map(|league| {
            Arc::new(AnalysisPipeline::new(pipeline_config.clone(), league, stats_provider.clone()))
        });
        let stats = Arc::new(StatsService::new(stats_provider, elo, cache, cache_ttl_secs));

        Self { api_key, fantrax, pipeline_config, pipeline, stats }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().map(|k| !k.is_empty()).unwrap_or(false)
    }

    /// The weekly pipeline, if a league is configured
    pub fn pipeline(&self) -> Result<&Arc<AnalysisPipeline>, ApiError> {
        self.pipeline.as_ref().ok_or_else(|| ApiError::from(LeagueClientError::invalid_config("LEAGUE_ID not set")))
    }

    pub fn league(&self) -> Result<&Arc<dyn LeagueClient>, ApiError> {
        self.pipeline().map(|p| p.league())
    }
}
