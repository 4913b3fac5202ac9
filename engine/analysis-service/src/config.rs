//! Service configuration management

use analysis_pipeline::PipelineConfig;
use anyhow::{Context, Result};
use league_client::FantraxConfig;
use serde::{Deserialize, Serialize};
use stats_fetcher::StatsConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an optional TOML config file
pub const CONFIG_ENV: &str = "CHEEKY_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// API key configuration
    pub auth: AuthConfig,

    /// Fantrax league configuration
    pub fantrax: FantraxConfig,

    /// Stats provider and public stats cache configuration
    pub stats: StatsConfig,

    /// Weekly pipeline configuration
    pub pipeline: PipelineConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret for protected routes; protected routes refuse every call when unset
    pub api_key: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, json, compact)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

/// Load configuration: defaults, then an optional TOML file, then `.env` and
/// environment overrides
pub fn load_configuration(config_file: Option<&Path>) -> Result<ServiceConfig> {
    dotenv::dotenv().ok();

    let config_file = config_file.map(Path::to_path_buf).or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));
    let mut config = match config_file {
        Some(path) => load_from_file(&path)?,
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    debug!("Loading configuration from file: {:?}", path);
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read config file: {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().with_context(|| format!("Invalid value for {}: {:?}", key, value))
}

/// Override configuration from environment variables
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(api_key) = lookup("API_KEY") {
        config.auth.api_key = Some(api_key).filter(|k| !k.is_empty());
    }

    if let Some(league_id) = lookup("LEAGUE_ID") {
        config.fantrax.league_id = league_id;
    }

    if let Some(cookie) = lookup("FANTRAX_COOKIE") {
        config.fantrax.session_cookie = Some(cookie).filter(|c| !c.trim().is_empty());
    }

    if let Some(season) = lookup("SEASON") {
        config.stats.season = season;
    }

    if let Some(competition) = lookup("COMPETITION") {
        config.stats.competition = competition;
    }

    if let Some(source) = lookup("STATS_SOURCE") {
        config.stats.source = source;
    }

    if let Some(data_dir) = lookup("DATA_DIR") {
        let data_dir = PathBuf::from(data_dir);
        config.stats.cache_dir = data_dir.join("cache");
        config.pipeline.data_dir = data_dir;
    }

    if let Some(threshold) = lookup("MATCH_THRESHOLD") {
        config.pipeline.match_threshold = parse_var("MATCH_THRESHOLD", &threshold)?;
    }

    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }

    if let Some(port) = lookup("PORT") {
        config.server.port = parse_var("PORT", &port)?;
    }

    if let Some(level) = lookup("LOG_LEVEL") {
        config.logging.level = level.to_lowercase();
    }

    if let Some(format) = lookup("LOG_FORMAT") {
        config.logging.format = format.to_lowercase();
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if config.server.port == 0 {
        return Err(anyhow::anyhow!("Invalid server port: {}", config.server.port));
    }

    config.stats.validate().map_err(|e| anyhow::anyhow!("Invalid stats configuration: {}", e))?;

    config.pipeline.validate().map_err(|e| anyhow::anyhow!("Invalid pipeline configuration: {}", e))?;

    Ok(())
}
