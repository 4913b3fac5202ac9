use crate::config::RetryConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Errors that may succeed when the call is repeated
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for league_client::LeagueClientError {
    fn is_transient(&self) -> bool {
        league_client::LeagueClientError::is_transient(self)
    }
}

impl Transient for stats_fetcher::StatsError {
    fn is_transient(&self) -> bool {
        stats_fetcher::StatsError::is_transient(self)
    }
}

/// Run a provider call, retrying transient failures with exponential backoff
pub async fn run_with_retry<F, Fut, T, E>(retry: &RetryConfig, operation: &str, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + Display,
{
    let mut delay = Duration::from_millis(retry.initial_delay_ms);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt <= retry.max_retries && e.is_transient() => {
                warn!("{} attempt {} failed: {}, retrying in {:?}", operation, attempt, e, delay);
                sleep(delay).await;

                delay = Duration::from_millis(
                    (delay.as_millis() as f64 * retry.backoff_multiplier).min(retry.max_delay_ms as f64) as u64,
                );
            }
            Err(e) => return Err(e),
        }
    }
}
