//! Analysis Pipeline
//!
//! One weekly run: fetch every roster slot, fetch season stats, refresh the
//! identity map, merge the two sides, derive per-90 metrics and a projected
//! points score, and write the weekly CSV and parquet artifacts.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod merge;
pub mod metrics;
pub mod pipeline;
pub mod retry;

pub use config::{PipelineConfig, RetryConfig, ScoringWeights};
pub use error::{PipelineError, Result};
pub use merge::{merge_records, MatchSource, MergedRecord};
pub use metrics::{apply_metrics, per90, projected_points};
pub use pipeline::{AnalysisPipeline, PipelineOutcome};
