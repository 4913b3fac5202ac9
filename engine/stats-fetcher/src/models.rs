use serde::{Deserialize, Serialize};

/// Season-long statistics for one player at one club
///
/// Keyed by `(player_name, team_name)` as the provider spells them; there is no
/// stable external ID. Every numeric column is nullable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    #[serde(rename = "player")]
    pub player_name: String,

    #[serde(rename = "team")]
    pub team_name: Option<String>,

    pub position: Option<String>,
    pub minutes: Option<f64>,
    pub goals: Option<f64>,
    pub assists: Option<f64>,
    pub xg: Option<f64>,
    pub xa: Option<f64>,
    pub npxg: Option<f64>,
    pub matches: Option<f64>,

    #[serde(default)]
    pub starts: Option<f64>,
    #[serde(default)]
    pub shots_total: Option<f64>,
    #[serde(default)]
    pub shots_on_target: Option<f64>,
    #[serde(default)]
    pub key_passes: Option<f64>,
}

impl StatsRow {
    pub fn named(player_name: impl Into<String>) -> Self {
        Self { player_name: player_name.into(), ..Default::default() }
    }
}

/// Latest Elo rating for a club
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamElo {
    pub team: String,
    pub country: String,
    pub level: u32,
    pub elo: f64,
}
