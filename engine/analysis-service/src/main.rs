//! Cheeky FC service
//!
//! Serves the weekly analysis API, or runs the pipeline once with `--run-week`.

use analysis_service::{api, initialize_logging, load_configuration, setup_signal_handlers, ServiceState};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cheeky-fc", version, about = "Cheeky FC fantasy football analysis service")]
struct Args {
    /// TOML configuration file (falls back to CHEEKY_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,

    /// Run the pipeline for this week and exit instead of serving
    #[arg(long)]
    run_week: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_configuration(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    initialize_logging(&config.logging)?;
    info!("Starting Cheeky FC service v{}", env!("CARGO_PKG_VERSION"));

    let state = Arc::new(ServiceState::from_config(&config)?);

    if let Some(week) = args.run_week {
        let pipeline = state.pipeline().map_err(|e| anyhow::anyhow!(e.message.clone()))?;
        let outcome = pipeline.run(week).await.with_context(|| format!("Pipeline run for week {} failed", week))?;
        info!(
            "Week {}: {} roster slots, {} stats rows, {} records with stats -> {:?}",
            outcome.week, outcome.roster_slots, outcome.stats_rows, outcome.matched_records, outcome.analysis_csv
        );
        return Ok(());
    }

    let addr = config.server.socket_addr()?;
    let mut shutdown = setup_signal_handlers()?;

    let (bound, server) = warp::serve(api(state))
        .try_bind_with_graceful_shutdown(addr, async move {
            shutdown.recv().await;
        })
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Cheeky FC API listening on http://{}", bound);
    server.await;

    info!("Cheeky FC service shutdown complete");
    Ok(())
}
