use crate::artifacts::{write_analysis, write_lineups, write_season_stats};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::merge::merge_records;
use crate::metrics::apply_metrics;
use crate::retry::run_with_retry;
use league_client::{fetch_week_roster, LeagueClient};
use player_registry::{IdentityMap, NameMatcher, UpdateReport};
use stats_fetcher::StatsProvider;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Summary of a completed weekly run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub week: u32,
    pub roster_slots: usize,
    pub stats_rows: usize,
    pub identity: UpdateReport,
    /// Records that found a stats row
    pub matched_records: usize,
    pub lineups: PathBuf,
    pub season_stats: PathBuf,
    pub analysis_csv: PathBuf,
    pub analysis_parquet: PathBuf,
}

/// Weekly roster/stats analysis. Runs are serialised per instance.
pub struct AnalysisPipeline {
    config: PipelineConfig,
    league: Arc<dyn LeagueClient>,
    stats: Arc<dyn StatsProvider>,
    run_guard: Mutex<()>,
}

impl AnalysisPipeline {
    pub fn new(config: PipelineConfig, league: Arc<dyn LeagueClient>, stats: Arc<dyn StatsProvider>) -> Self {
        Self { config, league, stats, run_guard: Mutex::new(()) }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn league(&self) -> &Arc<dyn LeagueClient> {
        &self.league
    }

    /// Run every stage for one week and write its artifacts
    pub async fn run(&self, week: u32) -> Result<PipelineOutcome> {
        if week < 1 {
            return Err(PipelineError::InvalidWeek(week));
        }

        let _guard = self.run_guard.lock().await;
        let config = &self.config;
        info!("Starting analysis run for week {}", week);
        std::fs::create_dir_all(&config.data_dir)?;

        let roster = run_with_retry(&config.retry, "roster fetch", || {
            fetch_week_roster(self.league.as_ref(), week)
        })
        .await?;
        let lineups = config.lineups_path(week);
        write_lineups(&lineups, &roster)?;
        info!("Roster: {} slots", roster.len());

        let stats = run_with_retry(&config.retry, "season stats fetch", || self.stats.fetch_season_stats()).await?;
        let season_stats = config.season_stats_path();
        write_season_stats(&season_stats, &stats)?;
        info!("Season stats: {} rows", stats.len());

        let map_path = config.identity_map_path();
        let mut identity = IdentityMap::load(&map_path)?;
        let matcher = NameMatcher::new(config.match_threshold);
        let report = identity.update(&roster, &stats, &matcher);
        identity.save(&map_path)?;

        let mut records = merge_records(&roster, &stats, &identity);
        apply_metrics(&mut records, &config.weights);
        let matched_records = records.iter().filter(|r| r.match_source.is_some()).count();
        info!("Merged {} records, {} with stats", records.len(), matched_records);

        let analysis_csv = config.analysis_path(week, "csv");
        let analysis_parquet = config.analysis_path(week, "parquet");
        write_analysis(&analysis_csv, &analysis_parquet, &records)?;
        info!("Week {} analysis written to {:?}", week, analysis_csv);

        Ok(PipelineOutcome {
            week,
            roster_slots: roster.len(),
            stats_rows: stats.len(),
            identity: report,
            matched_records,
            lineups,
            season_stats,
            analysis_csv,
            analysis_parquet,
        })
    }
}
