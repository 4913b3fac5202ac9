//! Weighted-ratio name scoring
//!
//! Scores are in [0, 100]. The combination mirrors the usual "WRatio" recipe:
//! an Indel similarity ratio, order-insensitive token ratios, and a partial
//! (substring window) ratio when one name is much longer than the other.
//! Names are compared as given; case and punctuation count.

use std::collections::BTreeSet;
use tracing::debug;

const TOKEN_SCALE: f64 = 0.95;

/// Length of the longest common subsequence
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb { diag + 1 } else { above.max(row[j]) };
            diag = above;
        }
    }
    row[b.len()]
}

/// Indel similarity: `1 - (insertions + deletions) / (len_a + len_b)`, scaled to 100
fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(&a, &b) as f64 / total as f64
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn token_set_ratio(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();

    let sect: Vec<&str> = ta.intersection(&tb).copied().collect();
    let only_a: Vec<&str> = ta.difference(&tb).copied().collect();
    let only_b: Vec<&str> = tb.difference(&ta).copied().collect();

    if !sect.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let sect = sect.join(" ");
    let join = |rest: &[&str]| {
        if sect.is_empty() {
            rest.join(" ")
        } else {
            format!("{} {}", sect, rest.join(" "))
        }
    };
    let combined_a = join(&only_a);
    let combined_b = join(&only_b);

    let mut best = ratio(&combined_a, &combined_b);
    if !sect.is_empty() {
        best = best.max(ratio(&sect, &combined_a)).max(ratio(&sect, &combined_b));
    }
    best
}

/// Best ratio of the shorter string against equal-length windows of the longer one
fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() { (a, b) } else { (b, a) };
    let long_chars: Vec<char> = long.chars().collect();
    let width = short.chars().count();
    if width == 0 {
        return 0.0;
    }

    (0..=long_chars.len() - width)
        .map(|start| {
            let window: String = long_chars[start..start + width].iter().collect();
            ratio(short, &window)
        })
        .fold(0.0, f64::max)
}

/// Similarity of two player names in [0, 100]
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0.0;
    }

    let base = ratio(a, b);
    let len_a = a.chars().count() as f64;
    let len_b = b.chars().count() as f64;
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    if len_ratio < 1.5 {
        return base
            .max(token_sort_ratio(a, b) * TOKEN_SCALE)
            .max(token_set_ratio(a, b) * TOKEN_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    base.max(partial_ratio(a, b) * partial_scale)
        .max(token_sort_ratio(a, b) * TOKEN_SCALE * partial_scale)
        .max(token_set_ratio(a, b) * TOKEN_SCALE * partial_scale)
}

/// Highest-scoring stats name for a league player
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub name: String,
    pub score: f64,
}

/// Picks the best stats name for a player and judges it against a threshold
#[derive(Debug, Clone)]
pub struct NameMatcher {
    threshold: f64,
}

impl NameMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn accepts(&self, score: f64) -> bool {
        score >= self.threshold
    }

    /// Best candidate by score. Candidates are visited in lexicographic order and
    /// only a strictly higher score replaces the leader, so ties resolve to the
    /// smallest name.
    pub fn best_match<'a, I>(&self, name: &str, candidates: I) -> Option<MatchCandidate>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ordered: BTreeSet<&str> = candidates.into_iter().collect();

        let mut best: Option<MatchCandidate> = None;
        for candidate in ordered {
            let score = weighted_ratio(name, candidate);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(MatchCandidate { name: candidate.to_string(), score });
            }
        }

        if let Some(found) = &best {
            debug!("Best match for '{}' is '{}' ({:.1})", name, found.name, found.score);
        }
        best
    }
}
