use serde::{Deserialize, Serialize};

/// A fantasy team in the league
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FantasyTeam {
    /// Platform team ID
    pub id: String,

    /// Display name
    pub name: String,
}

/// One player slot on a team's roster for a scoring period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSlot {
    pub team_id: String,
    pub team_name: String,

    /// Platform player ID (e.g. Fantrax scorer ID)
    pub player_id: String,

    /// Player name as the platform spells it (e.g. "J. Smith")
    pub player_name: String,

    /// Position label (e.g. "F", "M", "D", "G"); not every slot reports one
    pub position: Option<String>,

    /// True when the player sits on the bench / reserve for the period
    pub is_bench: bool,
}

impl RosterSlot {
    pub fn new(team: &FantasyTeam, player_id: impl Into<String>, player_name: impl Into<String>) -> Self {
        Self {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            player_id: player_id.into(),
            player_name: player_name.into(),
            position: None,
            is_bench: false,
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn on_bench(mut self, is_bench: bool) -> Self {
        self.is_bench = is_bench;
        self
    }
}
