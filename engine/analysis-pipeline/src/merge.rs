use league_client::RosterSlot;
use player_registry::IdentityMap;
use serde::{Deserialize, Serialize};
use stats_fetcher::StatsRow;
use std::collections::HashMap;

/// How a record's stats columns were found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    /// Through an accepted identity map entry
    Identity,
    /// By exact name equality
    Name,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSource::Identity => "identity",
            MatchSource::Name => "name",
        }
    }
}

/// A roster slot joined with its stats row and derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub team_id: String,
    pub team_name: String,
    pub player_id: String,
    pub player_name: String,
    pub position: Option<String>,
    pub is_bench: bool,

    pub fbref_id: Option<usize>,
    pub fbref_player_name: Option<String>,
    pub confidence: Option<f64>,
    pub match_source: Option<MatchSource>,

    pub team_name_fbref: Option<String>,
    pub pos_fbref: Option<String>,
    pub goals: Option<f64>,
    pub assists: Option<f64>,
    pub xg: Option<f64>,
    pub xa: Option<f64>,
    pub npxg: Option<f64>,
    pub matches: Option<f64>,
    pub minutes: Option<f64>,

    #[serde(rename = "xG90")]
    pub xg90: f64,
    #[serde(rename = "xA90")]
    pub xa90: f64,
    pub proj_points_simple: f64,
}

impl MergedRecord {
    /// Column order of the weekly analysis artifacts
    pub const COLUMNS: [&'static str; 22] = [
        "team_id",
        "team_name",
        "player_id",
        "player_name",
        "position",
        "is_bench",
        "fbref_id",
        "fbref_player_name",
        "confidence",
        "match_source",
        "team_name_fbref",
        "pos_fbref",
        "goals",
        "assists",
        "xg",
        "xa",
        "npxg",
        "matches",
        "minutes",
        "xG90",
        "xA90",
        "proj_points_simple",
    ];

    fn from_slot(slot: &RosterSlot) -> Self {
        Self {
            team_id: slot.team_id.clone(),
            team_name: slot.team_name.clone(),
            player_id: slot.player_id.clone(),
            player_name: slot.player_name.clone(),
            position: slot.position.clone(),
            is_bench: slot.is_bench,
            fbref_id: None,
            fbref_player_name: None,
            confidence: None,
            match_source: None,
            team_name_fbref: None,
            pos_fbref: None,
            goals: None,
            assists: None,
            xg: None,
            xa: None,
            npxg: None,
            matches: None,
            minutes: None,
            xg90: 0.0,
            xa90: 0.0,
            proj_points_simple: 0.0,
        }
    }

    /// Copy stats cells into columns that are still empty
    fn fill_from(&mut self, row: &StatsRow) {
        fn fill<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if slot.is_none() {
                *slot = value.clone();
            }
        }

        fill(&mut self.team_name_fbref, &row.team_name);
        fill(&mut self.pos_fbref, &row.position);
        fill(&mut self.goals, &row.goals);
        fill(&mut self.assists, &row.assists);
        fill(&mut self.xg, &row.xg);
        fill(&mut self.xa, &row.xa);
        fill(&mut self.npxg, &row.npxg);
        fill(&mut self.matches, &row.matches);
        fill(&mut self.minutes, &row.minutes);
    }
}

/// Join roster slots with stats rows, one record per slot in roster order.
///
/// Accepted identity entries are used first; any column still empty is then
/// taken from a stats row whose name equals the roster name exactly. When the
/// provider repeats a name the first row wins. `fbref_id` is the row's index in
/// the current table; the stored index is only kept when the name has gone.
pub fn merge_records(roster: &[RosterSlot], stats: &[StatsRow], identity: &IdentityMap) -> Vec<MergedRecord> {
    let mut by_name: HashMap<&str, (usize, &StatsRow)> = HashMap::new();
    for (idx, row) in stats.iter().enumerate() {
        by_name.entry(row.player_name.as_str()).or_insert((idx, row));
    }

    roster
        .iter()
        .map(|slot| {
            let mut record = MergedRecord::from_slot(slot);

            if let Some(entry) = identity.matched(&slot.player_id) {
                record.fbref_id = Some(entry.stats_player_id);
                record.fbref_player_name = Some(entry.stats_player_name.clone());
                record.confidence = Some(entry.confidence);

                if let Some((idx, row)) = by_name.get(entry.stats_player_name.as_str()) {
                    record.fbref_id = Some(*idx);
                    record.fill_from(row);
                    record.match_source = Some(MatchSource::Identity);
                }
            }

            if let Some((_, row)) = by_name.get(slot.player_name.as_str()) {
                record.fill_from(row);
                record.match_source.get_or_insert(MatchSource::Name);
            }

            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_client::FantasyTeam;
    use player_registry::{IdentityMapEntry, MatchStatus};

    fn team() -> FantasyTeam {
        FantasyTeam { id: "t01".to_string(), name: "Cheeky FC".to_string() }
    }

    fn stats_row(name: &str, minutes: f64, xg: f64, xa: f64) -> StatsRow {
        StatsRow {
            team_name: Some("Arsenal".to_string()),
            minutes: Some(minutes),
            xg: Some(xg),
            xa: Some(xa),
            ..StatsRow::named(name)
        }
    }

    fn identity(player_id: &str, stats_name: &str, status: MatchStatus) -> IdentityMap {
        let mut map = IdentityMap::new();
        map.upsert(IdentityMapEntry {
            player_id: player_id.to_string(),
            player_name: "J. Smith".to_string(),
            stats_player_id: 0,
            stats_player_name: stats_name.to_string(),
            confidence: 70.0,
            status,
        });
        map
    }

    #[test]
    fn test_identity_join() {
        let roster = vec![RosterSlot::new(&team(), "p1", "J. Smith").with_position("F")];
        let stats = vec![stats_row("John Smith", 900.0, 9.0, 4.5)];

        let merged = merge_records(&roster, &stats, &identity("p1", "John Smith", MatchStatus::Matched));

        assert_eq!(merged.len(), 1);
        let record = &merged[0];
        assert_eq!(record.match_source, Some(MatchSource::Identity));
        assert_eq!(record.fbref_player_name.as_deref(), Some("John Smith"));
        assert_eq!(record.minutes, Some(900.0));
        assert_eq!(record.team_name_fbref.as_deref(), Some("Arsenal"));
        assert_eq!(record.position.as_deref(), Some("F"));
    }

    #[test]
    fn test_fbref_id_follows_current_row_order() {
        let roster = vec![RosterSlot::new(&team(), "p1", "J. Smith"), RosterSlot::new(&team(), "p2", "Ana Díaz")];
        let stats = vec![stats_row("Bukayo Saka", 900.0, 5.0, 5.0), stats_row("John Smith", 900.0, 9.0, 4.5)];

        let mut map = identity("p1", "John Smith", MatchStatus::Matched);
        map.upsert(IdentityMapEntry {
            player_id: "p2".to_string(),
            player_name: "Ana Díaz".to_string(),
            stats_player_id: 7,
            stats_player_name: "Ana Diaz".to_string(),
            confidence: 90.0,
            status: MatchStatus::Matched,
        });

        let merged = merge_records(&roster, &stats, &map);

        // Stored index 0 is stale, John Smith is now row 1
        assert_eq!(merged[0].fbref_id, Some(1));
        // Name no longer in the table, stored index is kept
        assert_eq!(merged[1].fbref_id, Some(7));
        assert_eq!(merged[1].match_source, None);
    }

    #[test]
    fn test_name_fallback_fills_gaps() {
        let roster = vec![RosterSlot::new(&team(), "p1", "John Smith")];
        let mut partial = stats_row("Jon Smith", 900.0, 9.0, 4.5);
        partial.xa = None;
        let stats = vec![partial, stats_row("John Smith", 450.0, 1.0, 2.0)];

        let merged = merge_records(&roster, &stats, &identity("p1", "Jon Smith", MatchStatus::Matched));

        let record = &merged[0];
        assert_eq!(record.match_source, Some(MatchSource::Identity));
        // Identity row wins where it has data, exact name fills the rest
        assert_eq!(record.minutes, Some(900.0));
        assert_eq!(record.xa, Some(2.0));
    }

    #[test]
    fn test_unmatched_entries_are_ignored() {
        let roster = vec![RosterSlot::new(&team(), "p1", "J. Smith")];
        let stats = vec![stats_row("John Smith", 900.0, 9.0, 4.5)];

        let merged = merge_records(&roster, &stats, &identity("p1", "John Smith", MatchStatus::Unmatched));

        assert_eq!(merged[0].match_source, None);
        assert_eq!(merged[0].fbref_player_name, None);
        assert_eq!(merged[0].xg, None);
    }

    #[test]
    fn test_one_record_per_slot_in_order() {
        let roster = vec![
            RosterSlot::new(&team(), "p2", "Ana Díaz"),
            RosterSlot::new(&team(), "p1", "John Smith").on_bench(true),
            RosterSlot::new(&team(), "p1", "John Smith"),
        ];
        let stats = vec![
            stats_row("John Smith", 900.0, 9.0, 4.5),
            stats_row("John Smith", 10.0, 0.0, 0.0),
        ];

        let merged = merge_records(&roster, &stats, &IdentityMap::new());

        let ids: Vec<&str> = merged.iter().map(|r| r.player_id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1", "p1"]);
        assert!(merged[1].is_bench);
        assert_eq!(merged[1].match_source, Some(MatchSource::Name));
        assert_eq!(merged[1].minutes, Some(900.0));
        assert_eq!(merged[0].match_source, None);
    }

    #[test]
    fn test_empty_stats_keeps_roster() {
        let roster = vec![RosterSlot::new(&team(), "p1", "J. Smith")];
        let merged = merge_records(&roster, &[], &IdentityMap::new());

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].player_name, "J. Smith");
        assert_eq!(merged[0].goals, None);
        assert_eq!(merged[0].minutes, None);
    }
}
