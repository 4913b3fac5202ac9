//! ClubElo team strength ratings

use crate::config::EloConfig;
use crate::error::{Result, StatsError};
use crate::models::TeamElo;
use crate::provider::fetch_text;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use std::time::Duration;
use tracing::info;

/// Source of club strength ratings
#[async_trait]
pub trait EloProvider: Send + Sync {
    async fn fetch_team_ratings(&self) -> Result<Vec<TeamElo>>;
}

/// ClubElo daily ratings API client
pub struct ClubEloProvider {
    config: EloConfig,
    client: Client,
}

impl ClubEloProvider {
    pub fn new(config: EloConfig, request_timeout_secs: u64) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(request_timeout_secs)).build()?;
        Ok(Self { config, client })
    }

    fn ratings_url(&self, date: NaiveDate) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), date.format("%Y-%m-%d"))
    }
}

#[async_trait]
impl EloProvider for ClubEloProvider {
    async fn fetch_team_ratings(&self) -> Result<Vec<TeamElo>> {
        let url = self.ratings_url(Utc::now().date_naive());
        info!("Fetching ClubElo ratings from: {}", url);

        let text = fetch_text(&self.client, &url).await?;
        let ratings = parse_elo_table(&text, &self.config.country, self.config.level)?;
        info!("Kept {} {} level {} clubs", ratings.len(), self.config.country, self.config.level);
        Ok(ratings)
    }
}

/// Parse a ClubElo ratings table (`Rank,Club,Country,Level,Elo,From,To`)
pub fn parse_elo_table(text: &str, country: &str, level: u32) -> Result<Vec<TeamElo>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| StatsError::schema(format!("ClubElo table has no {name} column")))
    };
    let club_idx = column("Club")?;
    let country_idx = column("Country")?;
    let level_idx = column("Level")?;
    let elo_idx = column("Elo")?;

    let mut ratings = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row_country = record.get(country_idx).unwrap_or("");
        let row_level = record.get(level_idx).and_then(|v| v.parse::<u32>().ok());
        if row_country != country || row_level != Some(level) {
            continue;
        }

        let Some(elo) = record.get(elo_idx).and_then(|v| v.parse::<f64>().ok()) else {
            continue;
        };
        ratings.push(TeamElo {
            team: record.get(club_idx).unwrap_or("").to_string(),
            country: row_country.to_string(),
            level,
            elo,
        });
    }

    Ok(ratings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters_country_and_level() {
        let text = "\
Rank,Club,Country,Level,Elo,From,To
1,Man City,ENG,1,2001.5,2025-08-01,2025-08-10
2,Real Madrid,ESP,1,1980.2,2025-08-01,2025-08-10
None,Leeds,ENG,2,1650.0,2025-08-01,2025-08-10
4,Arsenal,ENG,1,1950.25,2025-08-01,2025-08-10
";
        let ratings = parse_elo_table(text, "ENG", 1).unwrap();

        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].team, "Man City");
        assert_eq!(ratings[1].elo, 1950.25);
        assert!(ratings.iter().all(|r| r.country == "ENG" && r.level == 1));
    }

    #[test]
    fn test_parse_requires_columns() {
        let result = parse_elo_table("Rank,Club\n1,Man City\n", "ENG", 1);
        assert!(matches!(result, Err(StatsError::Schema { .. })));
    }

    #[test]
    fn test_ratings_url() {
        let provider = ClubEloProvider::new(
            EloConfig { base_url: "http://api.clubelo.com/".to_string(), ..Default::default() },
            5,
        )
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 10, 4).unwrap();
        assert_eq!(provider.ratings_url(date), "http://api.clubelo.com/2025-10-04");
    }
}
