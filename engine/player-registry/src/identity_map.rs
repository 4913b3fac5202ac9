use crate::error::{RegistryError, Result};
use crate::matcher::NameMatcher;
use league_client::RosterSlot;
use serde::{Deserialize, Serialize};
use stats_fetcher::StatsRow;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Whether an entry's best candidate cleared the match threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Files written before the status column existed only held accepted matches
    #[default]
    Matched,
    Unmatched,
}

/// One league player's link to a stats provider player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityMapEntry {
    pub player_id: String,
    pub player_name: String,

    /// Row index of the first stats row carrying `stats_player_name`
    #[serde(rename = "fbref_id")]
    pub stats_player_id: usize,

    #[serde(rename = "fbref_player_name")]
    pub stats_player_name: String,

    /// Weighted-ratio score in [0, 100]
    pub confidence: f64,

    #[serde(default)]
    pub status: MatchStatus,
}

impl IdentityMapEntry {
    pub fn is_matched(&self) -> bool {
        self.status == MatchStatus::Matched
    }

    /// Whether this entry should replace `other` for the same player id
    fn supersedes(&self, other: &IdentityMapEntry) -> bool {
        match self.confidence.partial_cmp(&other.confidence) {
            Some(std::cmp::Ordering::Greater) => true,
            Some(std::cmp::Ordering::Equal) => self.is_matched() && !other.is_matched(),
            _ => false,
        }
    }
}

/// Counts from one identity map update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Players that were scored this run
    pub scored: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Entries in the map after the update
    pub total: usize,
}

/// Persisted identity map, at most one entry per player id
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    entries: BTreeMap<String, IdentityMapEntry>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the map from a CSV file. A missing file is an empty map.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = match csv::Reader::from_path(path) {
            Ok(reader) => reader,
            Err(e) => {
                if let csv::ErrorKind::Io(io) = e.kind() {
                    if io.kind() == std::io::ErrorKind::NotFound {
                        info!("No identity map at {:?}, starting empty", path);
                        return Ok(Self::new());
                    }
                }
                return Err(e.into());
            }
        };

        let mut map = Self::new();
        for record in reader.deserialize::<IdentityMapEntry>() {
            let entry = record?;
            if entry.player_id.trim().is_empty() {
                return Err(RegistryError::InvalidEntry {
                    player_id: entry.player_id,
                    message: "empty player id".to_string(),
                });
            }
            if !(0.0..=100.0).contains(&entry.confidence) {
                return Err(RegistryError::InvalidEntry {
                    message: format!("confidence {} outside [0, 100]", entry.confidence),
                    player_id: entry.player_id,
                });
            }
            map.upsert(entry);
        }

        info!("Loaded {} identity map entries from {:?}", map.len(), path);
        Ok(map)
    }

    /// Rewrite the whole file, sorted by player id
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            for entry in self.entries.values() {
                writer.serialize(entry)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;

        debug!("Saved {} identity map entries to {:?}", self.len(), path);
        Ok(())
    }

    /// Score every roster player without a matched entry against the stats names
    pub fn update(&mut self, roster: &[RosterSlot], stats: &[StatsRow], matcher: &NameMatcher) -> UpdateReport {
        // First row index per distinct stats name
        let mut first_row: BTreeMap<&str, usize> = BTreeMap::new();
        for (idx, row) in stats.iter().enumerate() {
            first_row.entry(row.player_name.as_str()).or_insert(idx);
        }

        let mut report = UpdateReport::default();
        let mut seen: HashSet<&str> = HashSet::new();
        for slot in roster {
            if !seen.insert(slot.player_id.as_str()) {
                continue;
            }
            if self.matched(&slot.player_id).is_some() {
                continue;
            }

            let Some(best) = matcher.best_match(&slot.player_name, first_row.keys().copied()) else {
                continue;
            };

            let status = if matcher.accepts(best.score) {
                report.matched += 1;
                MatchStatus::Matched
            } else {
                warn!(
                    "Low-confidence match for {} '{}': '{}' scored {:.1} (threshold {:.1})",
                    slot.player_id,
                    slot.player_name,
                    best.name,
                    best.score,
                    matcher.threshold()
                );
                report.unmatched += 1;
                MatchStatus::Unmatched
            };
            report.scored += 1;

            self.upsert(IdentityMapEntry {
                player_id: slot.player_id.clone(),
                player_name: slot.player_name.clone(),
                stats_player_id: first_row[best.name.as_str()],
                stats_player_name: best.name,
                confidence: best.score,
                status,
            });
        }

        report.total = self.len();
        info!(
            "Identity map update: scored {}, matched {}, unmatched {}, total {}",
            report.scored, report.matched, report.unmatched, report.total
        );
        report
    }

    /// Insert an entry, keeping the higher-confidence one on a duplicate id
    pub fn upsert(&mut self, entry: IdentityMapEntry) {
        match self.entries.get(&entry.player_id) {
            Some(existing) if !entry.supersedes(existing) => {}
            _ => {
                self.entries.insert(entry.player_id.clone(), entry);
            }
        }
    }

    pub fn get(&self, player_id: &str) -> Option<&IdentityMapEntry> {
        self.entries.get(player_id)
    }

    /// The entry for a player if it is an accepted match
    pub fn matched(&self, player_id: &str) -> Option<&IdentityMapEntry> {
        self.get(player_id).filter(|e| e.is_matched())
    }

    pub fn entries(&self) -> impl Iterator<Item = &IdentityMapEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_client::FantasyTeam;
    use tempfile::TempDir;

    fn slot(id: &str, name: &str) -> RosterSlot {
        let team = FantasyTeam { id: "t01".to_string(), name: "Cheeky FC".to_string() };
        RosterSlot::new(&team, id, name)
    }

    fn entry(id: &str, stats_name: &str, confidence: f64, status: MatchStatus) -> IdentityMapEntry {
        IdentityMapEntry {
            player_id: id.to_string(),
            player_name: stats_name.to_string(),
            stats_player_id: 0,
            stats_player_name: stats_name.to_string(),
            confidence,
            status,
        }
    }

    #[test]
    fn test_update_matches_initial() {
        let mut map = IdentityMap::new();
        let roster = vec![slot("p1", "J. Smith")];
        let stats = vec![StatsRow::named("Jordan Pickford"), StatsRow::named("John Smith")];

        let report = map.update(&roster, &stats, &NameMatcher::new(60.0));

        assert_eq!(report, UpdateReport { scored: 1, matched: 1, unmatched: 0, total: 1 });
        let found = map.matched("p1").unwrap();
        assert_eq!(found.stats_player_name, "John Smith");
        assert_eq!(found.stats_player_id, 1);
        assert!(found.confidence >= 60.0);
    }

    #[test]
    fn test_low_score_is_unmatched_and_retried() {
        let mut map = IdentityMap::new();
        let roster = vec![slot("p9", "Bukayo Saka")];

        let report = map.update(&roster, &[StatsRow::named("Jordan Pickford")], &NameMatcher::new(60.0));
        assert_eq!(report.unmatched, 1);
        assert!(map.matched("p9").is_none());
        assert_eq!(map.get("p9").unwrap().status, MatchStatus::Unmatched);

        let stats = vec![StatsRow::named("Jordan Pickford"), StatsRow::named("Bukayo Saka")];
        let report = map.update(&roster, &stats, &NameMatcher::new(60.0));
        assert_eq!(report.matched, 1);
        assert_eq!(map.matched("p9").unwrap().stats_player_name, "Bukayo Saka");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_matched_players_are_not_rescored() {
        let mut map = IdentityMap::new();
        map.upsert(entry("p1", "Someone Else", 88.0, MatchStatus::Matched));

        let report = map.update(&[slot("p1", "John Smith")], &[StatsRow::named("John Smith")], &NameMatcher::new(60.0));

        assert_eq!(report.scored, 0);
        assert_eq!(map.get("p1").unwrap().stats_player_name, "Someone Else");
    }

    #[test]
    fn test_empty_stats_adds_nothing() {
        let mut map = IdentityMap::new();
        let report = map.update(&[slot("p1", "J. Smith")], &[], &NameMatcher::new(60.0));

        assert_eq!(report.scored, 0);
        assert!(map.is_empty());
    }

    #[test]
    fn test_upsert_keeps_highest_confidence() {
        let mut map = IdentityMap::new();
        map.upsert(entry("p1", "Low", 55.0, MatchStatus::Matched));
        map.upsert(entry("p1", "High", 91.0, MatchStatus::Matched));
        map.upsert(entry("p1", "Lower", 70.0, MatchStatus::Matched));
        assert_eq!(map.get("p1").unwrap().stats_player_name, "High");

        map.upsert(entry("p2", "Tagged", 64.0, MatchStatus::Unmatched));
        map.upsert(entry("p2", "Accepted", 64.0, MatchStatus::Matched));
        assert!(map.matched("p2").is_some());
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let map = IdentityMap::load(dir.path().join("id_map.csv")).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_save_and_load_dedups_and_sorts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("id_map.csv");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "player_id,player_name,fbref_id,fbref_player_name,confidence\n\
             p2,A. Jones,4,Alan Jones,81.5\n\
             p1,J. Smith,0,Jon Smyth,62.0\n\
             p1,J. Smith,1,John Smith,70.0\n",
        )
        .unwrap();

        let map = IdentityMap::load(&path).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.matched("p1").unwrap().stats_player_name, "John Smith");

        map.save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "player_id,player_name,fbref_id,fbref_player_name,confidence,status");
        assert!(lines[1].starts_with("p1,"));
        assert!(lines[2].starts_with("p2,"));
        assert_eq!(lines.len(), 3);
        assert!(!path.with_extension("csv.tmp").exists());
    }

    #[test]
    fn test_rejects_out_of_range_confidence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("id_map.csv");
        std::fs::write(&path, "player_id,player_name,fbref_id,fbref_player_name,confidence,status\np1,X,0,Y,140,matched\n")
            .unwrap();

        assert!(matches!(IdentityMap::load(&path), Err(RegistryError::InvalidEntry { .. })));
    }
}
