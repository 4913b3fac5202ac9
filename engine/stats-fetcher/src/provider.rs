use crate::config::StatsConfig;
use crate::error::{Result, StatsError};
use crate::models::StatsRow;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Source of season-long player statistics
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Whole-season stats for every player in the competition
    async fn fetch_season_stats(&self) -> Result<Vec<StatsRow>>;
}

/// Reads an exported player stats table (CSV) from a URL or a local file
pub struct TableStatsProvider {
    source: String,
    client: Client,
}

impl TableStatsProvider {
    pub fn new(config: &StatsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { source: config.resolved_source(), client })
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[async_trait]
impl StatsProvider for TableStatsProvider {
    async fn fetch_season_stats(&self) -> Result<Vec<StatsRow>> {
        info!("Fetching season stats from: {}", self.source);
        let text = fetch_text(&self.client, &self.source).await?;
        let rows = parse_stats_table(&text)?;
        info!("Parsed {} player stats rows", rows.len());
        Ok(rows)
    }
}

/// Read a text document from an http(s) URL or a filesystem path
pub(crate) async fn fetch_text(client: &Client, location: &str) -> Result<String> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let response = client.get(location).send().await?;
        if !response.status().is_success() {
            return Err(StatsError::Status {
                status: response.status().as_u16(),
                url: location.to_string(),
            });
        }
        Ok(response.text().await?)
    } else {
        Ok(tokio::fs::read_to_string(location).await?)
    }
}

/// Canonical column name and the header aliases it accepts
const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    ("player", &["player", "fbref_player_name"]),
    ("team", &["team", "squad", "team_name_fbref"]),
    ("position", &["position", "pos", "pos_fbref"]),
    ("minutes", &["minutes", "min"]),
    ("goals", &["goals", "gls"]),
    ("assists", &["assists", "ast"]),
    ("xg", &["xg"]),
    ("xa", &["xa", "xag"]),
    ("npxg", &["npxg"]),
    ("matches", &["matches", "mp"]),
    ("starts", &["starts", "games_starts"]),
    ("shots_total", &["shots_total", "sh"]),
    ("shots_on_target", &["shots_on_target", "sot"]),
    ("key_passes", &["key_passes", "kp"]),
];

/// Parse a player stats table, normalising provider column names
pub fn parse_stats_table(text: &str) -> Result<Vec<StatsRow>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_lowercase()).collect();
    let mut columns: HashMap<&str, usize> = HashMap::new();
    for (canonical, aliases) in COLUMN_ALIASES {
        if let Some(idx) = aliases.iter().find_map(|alias| headers.iter().position(|h| h.as_str() == *alias)) {
            columns.insert(*canonical, idx);
        }
    }

    let Some(&player_idx) = columns.get("player") else {
        return Err(StatsError::schema(format!("no player column in headers {:?}", headers)));
    };
    debug!("Stats table columns resolved: {:?}", columns);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let player_name = record.get(player_idx).unwrap_or("").trim();
        if player_name.is_empty() {
            continue;
        }

        let cell = |name: &str| -> Option<String> {
            columns
                .get(name)
                .and_then(|&idx| record.get(idx))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let number = |name: &str| -> Option<f64> {
            columns.get(name).and_then(|&idx| record.get(idx)).and_then(parse_number)
        };

        rows.push(StatsRow {
            player_name: player_name.to_string(),
            team_name: cell("team"),
            position: cell("position"),
            minutes: number("minutes"),
            goals: number("goals"),
            assists: number("assists"),
            xg: number("xg"),
            xa: number("xa"),
            npxg: number("npxg"),
            matches: number("matches"),
            starts: number("starts"),
            shots_total: number("shots_total"),
            shots_on_target: number("shots_on_target"),
            key_passes: number("key_passes"),
        });
    }

    Ok(rows)
}

/// Parse a numeric cell; thousands separators are dropped, blanks are null
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fbref_export() {
        let text = "\
Player,Squad,Pos,MP,Starts,Min,Gls,Ast,xG,npxG,xAG
John Smith,Arsenal,FW,12,10,\"1,020\",7,3,6.4,5.6,2.9
Ana Díaz,Chelsea,MF,11,,890,1,4,1.2,1.2,
,Chelsea,DF,3,3,270,0,0,0.1,0.1,0.0
";
        let rows = parse_stats_table(text).unwrap();

        assert_eq!(rows.len(), 2);
        let smith = &rows[0];
        assert_eq!(smith.player_name, "John Smith");
        assert_eq!(smith.team_name.as_deref(), Some("Arsenal"));
        assert_eq!(smith.position.as_deref(), Some("FW"));
        assert_eq!(smith.minutes, Some(1020.0));
        assert_eq!(smith.goals, Some(7.0));
        assert_eq!(smith.xa, Some(2.9));
        assert_eq!(smith.matches, Some(12.0));
        assert_eq!(smith.starts, Some(10.0));
        assert_eq!(smith.key_passes, None);

        let diaz = &rows[1];
        assert_eq!(diaz.player_name, "Ana Díaz");
        assert_eq!(diaz.starts, None);
        assert_eq!(diaz.xa, None);
    }

    #[test]
    fn test_parse_canonical_columns() {
        let text = "player,team,position,minutes,goals,assists,xg,xa,npxg,matches,shots_total,key_passes\n\
                    Joe Bloggs,Everton,DF,900,1,0,0.5,0.3,0.5,10,8,4\n";
        let rows = parse_stats_table(text).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shots_total, Some(8.0));
        assert_eq!(rows[0].key_passes, Some(4.0));
        assert_eq!(rows[0].npxg, Some(0.5));
    }

    #[test]
    fn test_missing_player_column() {
        let result = parse_stats_table("team,minutes\nArsenal,900\n");
        assert!(matches!(result, Err(StatsError::Schema { .. })));
    }

    #[test]
    fn test_empty_table_has_no_rows() {
        let rows = parse_stats_table("player,team,minutes\n").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("2,340"), Some(2340.0));
        assert_eq!(parse_number(" 0.45 "), Some(0.45));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
    }

    #[tokio::test]
    async fn test_table_provider_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ENG_2025.csv");
        std::fs::write(&path, "player,team,minutes,xg,xa\nJohn Smith,Arsenal,900,9.0,4.5\n").unwrap();

        let config = StatsConfig {
            source: dir.path().join("ENG_{season}.csv").to_string_lossy().to_string(),
            season: "2025".to_string(),
            ..Default::default()
        };
        let provider = TableStatsProvider::new(&config).unwrap();
        let rows = provider.fetch_season_stats().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].xg, Some(9.0));
    }
}
