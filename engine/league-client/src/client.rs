use crate::error::Result;
use crate::types::{FantasyTeam, RosterSlot};
use async_trait::async_trait;
use tracing::{debug, info};

/// Typed access to a fantasy league
#[async_trait]
pub trait LeagueClient: Send + Sync {
    /// All teams in the league, in platform order
    async fn teams(&self) -> Result<Vec<FantasyTeam>>;

    /// Roster slots of one team for a scoring period
    async fn fetch_roster(&self, team: &FantasyTeam, period: u32) -> Result<Vec<RosterSlot>>;
}

/// Fetch every team's roster slots for a week
pub async fn fetch_week_roster(client: &dyn LeagueClient, week: u32) -> Result<Vec<RosterSlot>> {
    let teams = client.teams().await?;
    info!("Fetching week {} rosters for {} teams", week, teams.len());

    let mut slots = Vec::new();
    for team in &teams {
        let roster = client.fetch_roster(team, week).await?;
        debug!("Team {} ({}) has {} slots", team.name, team.id, roster.len());
        slots.extend(roster);
    }

    info!("Fetched {} roster slots for week {}", slots.len(), week);
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LeagueClientError;
    use std::sync::Mutex;

    struct FakeLeague {
        teams: Vec<FantasyTeam>,
        periods: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl LeagueClient for FakeLeague {
        async fn teams(&self) -> Result<Vec<FantasyTeam>> {
            Ok(self.teams.clone())
        }

        async fn fetch_roster(&self, team: &FantasyTeam, period: u32) -> Result<Vec<RosterSlot>> {
            self.periods.lock().unwrap().push(period);
            if team.id == "broken" {
                return Err(LeagueClientError::schema("no tables"));
            }
            Ok(vec![
                RosterSlot::new(team, format!("{}-1", team.id), "Starter").with_position("F"),
                RosterSlot::new(team, format!("{}-2", team.id), "Sub").on_bench(true),
            ])
        }
    }

    fn team(id: &str, name: &str) -> FantasyTeam {
        FantasyTeam { id: id.to_string(), name: name.to_string() }
    }

    #[tokio::test]
    async fn test_week_roster_keeps_team_order() {
        let league = FakeLeague {
            teams: vec![team("t1", "Cheeky FC"), team("t2", "Rivals")],
            periods: Mutex::new(Vec::new()),
        };

        let slots = fetch_week_roster(&league, 7).await.unwrap();

        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].team_name, "Cheeky FC");
        assert_eq!(slots[2].team_id, "t2");
        assert!(slots[3].is_bench);
        assert_eq!(*league.periods.lock().unwrap(), vec![7, 7]);
    }

    #[tokio::test]
    async fn test_week_roster_propagates_errors() {
        let league = FakeLeague {
            teams: vec![team("t1", "Cheeky FC"), team("broken", "Broken")],
            periods: Mutex::new(Vec::new()),
        };

        let result = fetch_week_roster(&league, 1).await;
        assert!(matches!(result, Err(LeagueClientError::Schema { .. })));
    }
}
