//! Deterministic quality scoring.
//!
//! Derives a 0–100 score with an itemized breakdown from an
//! [`AnalysisRecord`]. Pure and total: every field is read through a
//! presence check, so heterogeneous or missing model output can never
//! make scoring fail.

use crate::models::{AnalysisRecord, QualityScore, Rating, ScoreBreakdown};

const BASE_SCORE: i64 = 100;

const HIGH_ISSUE_PENALTY: i64 = 10;
const MEDIUM_ISSUE_PENALTY: i64 = 5;
const LOW_ISSUE_PENALTY: i64 = 2;

const MEDIUM_COMPLEXITY_PENALTY: i64 = 5;
const HIGH_COMPLEXITY_PENALTY: i64 = 15;

const READABILITY_ADJUSTMENT: i64 = 10;
const MAINTAINABILITY_MULTIPLIER: f64 = 2.0;

/// Score a record.
///
/// Starts from 100, subtracts per-issue and complexity penalties, adds
/// the readability and maintainability adjustments, and clamps the
/// result to `[0, 100]`. The unclamped contributions are reported in
/// the breakdown so the score is auditable.
pub fn score(record: &AnalysisRecord) -> QualityScore {
    let issues_penalty: i64 = record.issues.iter().map(|i| issue_penalty(&i.severity)).sum();

    let rating = record.rating.as_ref();
    let complexity_penalty = complexity_penalty(rating);
    let readability_bonus = readability_bonus(rating);
    let maintainability_score = maintainability_score(rating);

    let total =
        BASE_SCORE - issues_penalty - complexity_penalty + readability_bonus + maintainability_score;

    QualityScore {
        score: total.clamp(0, 100),
        breakdown: ScoreBreakdown {
            base_score: BASE_SCORE,
            issues_penalty,
            complexity_penalty,
            readability_bonus,
            maintainability_score,
        },
    }
}

/// Per-issue penalty by severity. Anything other than high/medium is
/// treated as a low-severity issue.
fn issue_penalty(severity: &str) -> i64 {
    if severity.eq_ignore_ascii_case("high") {
        HIGH_ISSUE_PENALTY
    } else if severity.eq_ignore_ascii_case("medium") {
        MEDIUM_ISSUE_PENALTY
    } else {
        LOW_ISSUE_PENALTY
    }
}

/// Complexity penalty: low → 0, medium → 5, high → 15.
///
/// An absent rating (or an unrecognized level) applies no penalty — an
/// unknown complexity must not be scored as if it were high. The
/// normalizer's fallback always supplies "medium", so the absent branch
/// is rarely reached in practice, but it is kept live deliberately.
fn complexity_penalty(rating: Option<&Rating>) -> i64 {
    match rating.and_then(|r| r.complexity.as_deref()) {
        Some(level) if level.eq_ignore_ascii_case("high") => HIGH_COMPLEXITY_PENALTY,
        Some(level) if level.eq_ignore_ascii_case("medium") => MEDIUM_COMPLEXITY_PENALTY,
        _ => 0,
    }
}

/// Readability adjustment: high → +10, low → −10, medium or absent → 0.
fn readability_bonus(rating: Option<&Rating>) -> i64 {
    match rating.and_then(|r| r.readability.as_deref()) {
        Some(level) if level.eq_ignore_ascii_case("high") => READABILITY_ADJUSTMENT,
        Some(level) if level.eq_ignore_ascii_case("low") => -READABILITY_ADJUSTMENT,
        _ => 0,
    }
}

/// Maintainability adjustment: the 1–10 rating doubled, absent → 0.
fn maintainability_score(rating: Option<&Rating>) -> i64 {
    rating
        .and_then(|r| r.maintainability)
        .map(|m| (m * MAINTAINABILITY_MULTIPLIER).round() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Issue;

    fn issue(severity: &str) -> Issue {
        Issue {
            severity: severity.to_string(),
            line: Some(1),
            description: "demo".to_string(),
            suggestion: "fix".to_string(),
        }
    }

    fn rated(complexity: &str, readability: &str, maintainability: f64) -> AnalysisRecord {
        AnalysisRecord {
            rating: Some(Rating {
                complexity: Some(complexity.to_string()),
                readability: Some(readability.to_string()),
                maintainability: Some(maintainability),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_perfect_record_clamps_to_100() {
        // 100 + 0 + 10 + 20 = 130 before the clamp.
        let quality = score(&rated("low", "high", 10.0));
        assert_eq!(quality.score, 100);
        assert_eq!(quality.breakdown.issues_penalty, 0);
        assert_eq!(quality.breakdown.complexity_penalty, 0);
        assert_eq!(quality.breakdown.readability_bonus, 10);
        assert_eq!(quality.breakdown.maintainability_score, 20);
    }

    #[test]
    fn test_issue_penalties_accumulate() {
        let record = AnalysisRecord {
            issues: vec![issue("high"), issue("high"), issue("medium")],
            ..Default::default()
        };
        let quality = score(&record);
        assert_eq!(quality.breakdown.issues_penalty, 25);
        assert_eq!(quality.score, 75);
    }

    #[test]
    fn test_extreme_issue_count_clamps_to_zero() {
        let record = AnalysisRecord {
            issues: (0..20).map(|_| issue("high")).collect(),
            ..Default::default()
        };
        let quality = score(&record);
        assert_eq!(quality.breakdown.issues_penalty, 200);
        assert_eq!(quality.score, 0);
    }

    #[test]
    fn test_high_complexity_with_heavy_issues() {
        let mut record = rated("high", "medium", 0.0);
        record.rating.as_mut().unwrap().maintainability = None;
        record.issues = (0..5).map(|_| issue("high")).collect();
        let quality = score(&record);
        // 100 - 50 - 15 + 0 + 0 = 35
        assert_eq!(quality.score, 35);
        assert_eq!(quality.breakdown.complexity_penalty, 15);
    }

    #[test]
    fn test_absent_rating_applies_no_penalty() {
        let quality = score(&AnalysisRecord::default());
        assert_eq!(quality.score, 100);
        assert_eq!(quality.breakdown.complexity_penalty, 0);
        assert_eq!(quality.breakdown.readability_bonus, 0);
        assert_eq!(quality.breakdown.maintainability_score, 0);
    }

    #[test]
    fn test_unrecognized_complexity_applies_no_penalty() {
        let quality = score(&rated("unknown", "medium", 5.0));
        assert_eq!(quality.breakdown.complexity_penalty, 0);
    }

    #[test]
    fn test_low_readability_subtracts() {
        let quality = score(&rated("medium", "low", 5.0));
        // 100 - 0 - 5 - 10 + 10 = 95
        assert_eq!(quality.breakdown.readability_bonus, -10);
        assert_eq!(quality.score, 95);
    }

    #[test]
    fn test_fallback_rating_scores_105_unclamped() {
        // medium/medium/5 is the normalizer's fallback rating:
        // 100 - 5 + 0 + 10 = 105 → clamped.
        let quality = score(&rated("medium", "medium", 5.0));
        assert_eq!(quality.score, 100);
        assert_eq!(quality.breakdown.complexity_penalty, 5);
        assert_eq!(quality.breakdown.maintainability_score, 10);
    }

    #[test]
    fn test_score_is_idempotent() {
        let mut record = rated("medium", "high", 7.0);
        record.issues = vec![issue("low"), issue("medium")];
        assert_eq!(score(&record), score(&record));
    }

    #[test]
    fn test_breakdown_reconstructs_score() {
        let mut record = rated("high", "low", 3.0);
        record.issues = vec![issue("high"), issue("low")];
        let quality = score(&record);
        let b = &quality.breakdown;
        let reconstructed = (b.base_score - b.issues_penalty - b.complexity_penalty
            + b.readability_bonus
            + b.maintainability_score)
            .clamp(0, 100);
        assert_eq!(quality.score, reconstructed);
    }

    #[test]
    fn test_score_always_in_range() {
        let extremes = [
            AnalysisRecord::default(),
            rated("low", "high", 10.0),
            AnalysisRecord {
                issues: (0..50).map(|_| issue("high")).collect(),
                ..rated("high", "low", 1.0)
            },
        ];
        for record in &extremes {
            let quality = score(record);
            assert!((0..=100).contains(&quality.score));
        }
    }
}
