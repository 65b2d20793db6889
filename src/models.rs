//! Core data models used throughout Code Lens.
//!
//! These types represent the analysis records that flow from the model
//! gateway through normalization, scoring, and persistence. Every field
//! the model supplies is tagged-optional: the normalizer accepts whatever
//! well-formed JSON the model produced, and downstream consumers must
//! treat optional fields as possibly absent.

use serde::{Deserialize, Serialize};

/// Input size classification. Controls which response schema the model
/// is asked for and how large the token budget is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SizeTier {
    Standard,
    Large,
    VeryLarge,
}

impl SizeTier {
    /// Whether this tier uses the section-based (large-file) response
    /// shape instead of per-line annotations.
    pub fn is_large(&self) -> bool {
        !matches!(self, SizeTier::Standard)
    }
}

/// Normalized result of a code analysis, shaped by the request's tier.
///
/// Exactly one of `line_by_line` (Standard) and `sections`
/// (Large/VeryLarge) may be non-empty; the normalizer enforces this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// Overall explanation. On parse failure this carries the raw model
    /// output verbatim so no model text is ever discarded.
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub line_by_line: Vec<LineNote>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub improvements: Vec<Improvement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

/// Quality ratings as reported by the model. Levels are kept as loose
/// strings (`"low"` / `"medium"` / `"high"`); the scorer treats
/// anything unrecognized as absent rather than failing the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readability: Option<String>,
    /// Maintainability score from 1 to 10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainability: Option<f64>,
}

/// Per-line annotation. Populated only for Standard-tier analyses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineNote {
    #[serde(default)]
    pub line: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub explanation: String,
}

/// Logical region of a large file. Populated only for Large/VeryLarge
/// tiers, where per-line detail would be prohibitively verbose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_line: i64,
    #[serde(default)]
    pub end_line: i64,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// `"high"`, `"medium"`, or `"low"`.
    #[serde(default)]
    pub severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// File-level overview for large analyses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_functions: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_classes: Option<i64>,
    #[serde(default)]
    pub lines_of_code: i64,
    #[serde(default)]
    pub key_patterns: Vec<String>,
    #[serde(default)]
    pub main_dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture_notes: Option<String>,
}

/// Deterministic 0–100 quality score with its itemized breakdown.
///
/// Invariant: `score == clamp(base_score - issues_penalty -
/// complexity_penalty + readability_bonus + maintainability_score, 0, 100)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityScore {
    pub score: i64,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Always 100.
    pub base_score: i64,
    /// Positive magnitude subtracted for reported issues.
    pub issues_penalty: i64,
    /// Positive magnitude subtracted for rated complexity.
    pub complexity_penalty: i64,
    /// Signed adjustment from the readability rating.
    pub readability_bonus: i64,
    /// Signed adjustment from the maintainability rating (× 2).
    pub maintainability_score: i64,
}
