//! Per-90 rates and the projected points score

use crate::config::ScoringWeights;
use crate::merge::MergedRecord;

/// Rate per 90 minutes; 0.0 when either side is missing or minutes are not positive
pub fn per90(value: Option<f64>, minutes: Option<f64>) -> f64 {
    match (value, minutes) {
        (Some(v), Some(m)) if m > 0.0 => v / m * 90.0,
        _ => 0.0,
    }
}

/// Season projection from per-90 rates, scaled by capped minutes
pub fn projected_points(xg90: f64, xa90: f64, minutes: Option<f64>, weights: &ScoringWeights) -> f64 {
    let minutes = minutes.unwrap_or(0.0).clamp(0.0, weights.minutes_cap);
    (xg90 * weights.goal_weight + xa90 * weights.assist_weight) * minutes / 90.0
}

/// Fill the metric columns of every merged record
pub fn apply_metrics(records: &mut [MergedRecord], weights: &ScoringWeights) {
    for record in records.iter_mut() {
        record.xg90 = per90(record.xg, record.minutes);
        record.xa90 = per90(record.xa, record.minutes);
        record.proj_points_simple = projected_points(record.xg90, record.xa90, record.minutes, weights);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_per90_guards_zero_minutes() {
        assert_eq!(per90(Some(0.0), Some(0.0)), 0.0);
        assert_eq!(per90(Some(5.0), Some(0.0)), 0.0);
        assert_eq!(per90(Some(5.0), Some(-90.0)), 0.0);
        assert_eq!(per90(None, Some(900.0)), 0.0);
        assert_eq!(per90(Some(5.0), None), 0.0);
        assert!(close(per90(Some(9.0), Some(900.0)), 0.9));
    }

    #[test]
    fn test_projection_matches_formula() {
        let weights = ScoringWeights::default();
        // (0.9 * 6 + 0.45 * 4) * 900 / 90
        assert!(close(projected_points(0.9, 0.45, Some(900.0), &weights), 72.0));
    }

    #[test]
    fn test_projection_caps_minutes() {
        let weights = ScoringWeights::default();
        let capped = projected_points(0.5, 0.0, Some(4500.0), &weights);
        assert!(close(capped, 0.5 * 6.0 * 3000.0 / 90.0));

        assert_eq!(projected_points(0.5, 0.5, None, &weights), 0.0);
        assert_eq!(projected_points(0.5, 0.5, Some(-10.0), &weights), 0.0);
    }

    #[test]
    fn test_projection_non_negative() {
        let weights = ScoringWeights::default();
        for (xg, xa, minutes) in [(0.0, 0.0, 0.0), (3.2, 0.0, 270.0), (0.0, 1.1, 3400.0), (12.0, 7.5, 2100.0)] {
            let xg90 = per90(Some(xg), Some(minutes));
            let xa90 = per90(Some(xa), Some(minutes));
            assert!(projected_points(xg90, xa90, Some(minutes), &weights) >= 0.0);
        }
    }
}
