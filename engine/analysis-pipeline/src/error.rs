use thiserror::Error;

/// Errors from a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid week {0}: weeks start at 1")]
    InvalidWeek(u32),

    #[error("League error: {0}")]
    League(#[from] league_client::LeagueClientError),

    #[error("Stats error: {0}")]
    Stats(#[from] stats_fetcher::StatsError),

    #[error("Identity map error: {0}")]
    Registry(#[from] player_registry::RegistryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
