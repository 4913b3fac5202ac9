//! Fantrax API integration

use crate::client::LeagueClient;
use crate::config::FantraxConfig;
use crate::error::{LeagueClientError, Result};
use crate::types::{FantasyTeam, RosterSlot};
use async_trait::async_trait;
use reqwest::header::{COOKIE, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// Fantrax roster status for a player in the active lineup
const ACTIVE_STATUS_ID: &str = "1";

/// Fantrax API client
#[derive(Debug)]
pub struct FantraxClient {
    config: FantraxConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct RequestEnvelope<'a> {
    msgs: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    method: &'a str,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    responses: Vec<ResponseMessage>,
    #[serde(rename = "pageError")]
    page_error: Option<PageError>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PageError {
    code: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TeamsData {
    #[serde(rename = "fantasyTeams", default)]
    fantasy_teams: Vec<FantraxTeam>,
}

#[derive(Debug, Deserialize)]
struct FantraxTeam {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RosterData {
    #[serde(default)]
    tables: Vec<RosterTable>,
}

#[derive(Debug, Deserialize)]
struct RosterTable {
    #[serde(default)]
    rows: Vec<RosterRow>,
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    scorer: Option<Scorer>,
    #[serde(rename = "statusId")]
    status_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Scorer {
    #[serde(rename = "scorerId")]
    scorer_id: String,
    name: String,
    #[serde(rename = "posShortNames")]
    pos_short_names: Option<String>,
}

impl FantraxClient {
    /// Create a new Fantrax client. Fails before any I/O when the league is not configured.
    pub fn new(config: FantraxConfig) -> Result<Self> {
        if !config.has_league_id() {
            return Err(LeagueClientError::invalid_config("LEAGUE_ID not set"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn league_id(&self) -> &str {
        &self.config.league_id
    }

    /// Send one method call and return its `data` payload
    async fn call(&self, method: &str, mut data: serde_json::Value) -> Result<serde_json::Value> {
        if let Some(obj) = data.as_object_mut() {
            obj.insert("leagueId".to_string(), serde_json::Value::String(self.config.league_id.clone()));
        }

        let url = format!(
            "{}/fxpa/req?leagueId={}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.league_id
        );
        let body = RequestEnvelope { msgs: vec![RequestMessage { method, data }] };

        debug!("Fantrax {} -> {}", method, url);
        let mut request = self
            .client
            .post(&url)
            .header(USER_AGENT, "Mozilla/5.0")
            .json(&body);
        if let Some(cookie) = self.config.session_cookie.as_deref().filter(|c| !c.trim().is_empty()) {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Fantrax {} failed with status {}", method, status);
            return Err(LeagueClientError::Status { status: status.as_u16(), body });
        }

        let text = response.text().await?;
        unwrap_envelope(&text)
    }
}

#[async_trait]
impl LeagueClient for FantraxClient {
    async fn teams(&self) -> Result<Vec<FantasyTeam>> {
        let data = self.call("getFantasyTeams", serde_json::json!({})).await?;
        let teams = parse_teams(data)?;
        info!("Fantrax league {} has {} teams", self.config.league_id, teams.len());
        Ok(teams)
    }

    async fn fetch_roster(&self, team: &FantasyTeam, period: u32) -> Result<Vec<RosterSlot>> {
        let data = self
            .call(
                "getTeamRosterInfo",
                serde_json::json!({ "teamId": team.id, "period": period.to_string() }),
            )
            .await?;
        parse_roster(team, data)
    }
}

fn unwrap_envelope(text: &str) -> Result<serde_json::Value> {
    let envelope: ResponseEnvelope = serde_json::from_str(text)
        .map_err(|e| LeagueClientError::schema(format!("invalid response envelope: {e}")))?;

    if let Some(page_error) = envelope.page_error {
        return Err(LeagueClientError::Api {
            message: format!(
                "{} ({})",
                page_error.title.unwrap_or_else(|| "request rejected".to_string()),
                page_error.code.unwrap_or_else(|| "unknown".to_string())
            ),
        });
    }

    envelope
        .responses
        .into_iter()
        .next()
        .map(|r| r.data)
        .ok_or_else(|| LeagueClientError::schema("response envelope has no responses"))
}

fn parse_teams(data: serde_json::Value) -> Result<Vec<FantasyTeam>> {
    let parsed: TeamsData = serde_json::from_value(data)
        .map_err(|e| LeagueClientError::schema(format!("invalid fantasy teams payload: {e}")))?;

    Ok(parsed
        .fantasy_teams
        .into_iter()
        .map(|t| FantasyTeam { id: t.id, name: t.name })
        .collect())
}

fn parse_roster(team: &FantasyTeam, data: serde_json::Value) -> Result<Vec<RosterSlot>> {
    let parsed: RosterData = serde_json::from_value(data)
        .map_err(|e| LeagueClientError::schema(format!("invalid roster payload: {e}")))?;

    let mut slots = Vec::new();
    for row in parsed.tables.into_iter().flat_map(|t| t.rows) {
        // Empty lineup slots have no scorer
        let Some(scorer) = row.scorer else {
            continue;
        };
        let is_bench = row.status_id.as_deref() != Some(ACTIVE_STATUS_ID);
        slots.push(RosterSlot {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            player_id: scorer.scorer_id,
            player_name: scorer.name,
            position: scorer.pos_short_names.filter(|p| !p.is_empty()),
            is_bench,
        });
    }

    Ok(slots)
}
