//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Weekly pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding artifacts and the identity map
    pub data_dir: PathBuf,

    /// File name prefix for weekly artifacts
    pub artifact_prefix: String,

    /// Minimum weighted-ratio score for a fuzzy match to be accepted
    pub match_threshold: f64,

    /// Projected points weights
    pub weights: ScoringWeights,

    /// Retry policy for provider calls
    pub retry: RetryConfig,
}

/// Weights for the projected points score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub goal_weight: f64,
    pub assist_weight: f64,

    /// Season minutes are clipped to this before projecting
    pub minutes_cap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt; 0 means a single attempt
    pub max_retries: u32,

    /// Initial retry delay in milliseconds
    pub initial_delay_ms: u64,

    /// Maximum retry delay in milliseconds
    pub max_delay_ms: u64,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            artifact_prefix: "cheekyfc".to_string(),
            match_threshold: 60.0,
            weights: ScoringWeights::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self { goal_weight: 6.0, assist_weight: 4.0, minutes_cap: 3000.0 }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 0, initial_delay_ms: 500, max_delay_ms: 5_000, backoff_multiplier: 2.0 }
    }
}

impl PipelineConfig {
    pub fn identity_map_path(&self) -> PathBuf {
        self.data_dir.join("id_map.csv")
    }

    pub fn lineups_path(&self, week: u32) -> PathBuf {
        self.data_dir.join(format!("{}_lineups_week{}.csv", self.artifact_prefix, week))
    }

    pub fn season_stats_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}_fbref_season_stats.parquet", self.artifact_prefix))
    }

    /// Weekly analysis artifact with the given extension (`csv` or `parquet`)
    pub fn analysis_path(&self, week: u32, extension: &str) -> PathBuf {
        self.data_dir.join(format!("{}_player_analysis_week{}.{}", self.artifact_prefix, week, extension))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.artifact_prefix.trim().is_empty() {
            return Err("artifact_prefix must not be empty".to_string());
        }

        if !(0.0..=100.0).contains(&self.match_threshold) {
            return Err(format!("match_threshold {} must be within [0, 100]", self.match_threshold));
        }

        let non_negative = |w: f64| w.is_finite() && w >= 0.0;
        if !non_negative(self.weights.goal_weight) || !non_negative(self.weights.assist_weight) {
            return Err("scoring weights must be finite and non-negative".to_string());
        }

        if !(self.weights.minutes_cap.is_finite() && self.weights.minutes_cap > 0.0) {
            return Err("minutes_cap must be finite and greater than 0".to_string());
        }

        if !(self.retry.backoff_multiplier.is_finite() && self.retry.backoff_multiplier >= 1.0) {
            return Err("retry backoff_multiplier must be at least 1.0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths() {
        let config = PipelineConfig { data_dir: PathBuf::from("/tmp/cfc"), ..Default::default() };

        assert_eq!(config.lineups_path(3), PathBuf::from("/tmp/cfc/cheekyfc_lineups_week3.csv"));
        assert_eq!(config.season_stats_path(), PathBuf::from("/tmp/cfc/cheekyfc_fbref_season_stats.parquet"));
        assert_eq!(
            config.analysis_path(3, "parquet"),
            PathBuf::from("/tmp/cfc/cheekyfc_player_analysis_week3.parquet")
        );
        assert_eq!(config.identity_map_path(), PathBuf::from("/tmp/cfc/id_map.csv"));
    }

    #[test]
    fn test_validate() {
        assert!(PipelineConfig::default().validate().is_ok());

        let config = PipelineConfig { match_threshold: 120.0, ..Default::default() };
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.weights.minutes_cap = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_and_infinite() {
        let mut config = PipelineConfig::default();
        config.weights.minutes_cap = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.weights.goal_weight = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.weights.assist_weight = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.retry.backoff_multiplier = f64::NAN;
        assert!(config.validate().is_err());
    }
}
