//! Model output normalization.
//!
//! Turns raw gateway text into an [`AnalysisRecord`]. Models frequently
//! wrap their JSON in markdown code fences, sometimes return bare JSON,
//! and sometimes return prose that is not JSON at all. This module
//! never fails: malformed output degrades to a deterministic fallback
//! record that preserves the raw text as the explanation, so the caller
//! always gets partial value instead of a hard error.

use crate::models::{AnalysisRecord, Rating, SizeTier, Summary};

/// Maintainability assumed when the model output could not be parsed.
const FALLBACK_MAINTAINABILITY: f64 = 5.0;

/// Normalize raw model output into a tier-shaped record.
///
/// Infallible by design. Parse failure selects the fallback path; a
/// successful parse is taken as-is apart from tier-shape enforcement.
pub fn normalize(raw: &str, tier: SizeTier, line_count: usize) -> AnalysisRecord {
    match parse_record(extract_json_candidate(raw)) {
        Ok(mut record) => {
            enforce_tier_shape(&mut record, tier);
            record
        }
        Err(err) => {
            eprintln!("Failed to parse model response ({err}); using fallback record");
            fallback_record(raw, tier, line_count)
        }
    }
}

/// Locate the JSON candidate inside raw model text.
///
/// Prefers the interior of a ```json fenced block, then any ``` fenced
/// block, and finally the raw text itself.
pub fn extract_json_candidate(raw: &str) -> &str {
    if let Some(inner) = fenced_block(raw, "```json") {
        return inner;
    }
    if let Some(inner) = fenced_block(raw, "```") {
        return inner;
    }
    raw.trim()
}

/// Extract the interior of the first fence opened by `marker`.
fn fenced_block<'a>(raw: &'a str, marker: &str) -> Option<&'a str> {
    let start = raw.find(marker)? + marker.len();
    let rest = &raw[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Parse a JSON candidate into a record.
///
/// No deep schema validation: any JSON object is accepted, with every
/// missing field defaulting per [`AnalysisRecord`]'s tagged-optional
/// definition. Non-object JSON (a bare string or array) is a parse
/// error and selects the fallback path.
pub fn parse_record(candidate: &str) -> Result<AnalysisRecord, serde_json::Error> {
    serde_json::from_str(candidate)
}

/// Clear whichever detail shape does not belong to the tier.
///
/// Standard records carry `lineByLine`; Large/VeryLarge records carry
/// `sections` + `summary`. A record must never hold both, so the
/// off-tier shape is dropped even if the model supplied it.
fn enforce_tier_shape(record: &mut AnalysisRecord, tier: SizeTier) {
    if tier.is_large() {
        record.line_by_line.clear();
    } else {
        record.sections.clear();
        record.summary = None;
    }
}

/// Deterministic record used when model output is not valid JSON.
///
/// The raw text is preserved verbatim as the explanation, ratings
/// default to medium/medium/5, and the tier-appropriate detail shape is
/// present but empty.
pub fn fallback_record(raw: &str, tier: SizeTier, line_count: usize) -> AnalysisRecord {
    let mut record = AnalysisRecord {
        explanation: raw.to_string(),
        rating: Some(Rating {
            complexity: Some("medium".to_string()),
            readability: Some("medium".to_string()),
            maintainability: Some(FALLBACK_MAINTAINABILITY),
        }),
        ..Default::default()
    };

    if tier.is_large() {
        record.summary = Some(Summary {
            total_functions: Some(0),
            total_classes: Some(0),
            lines_of_code: line_count as i64,
            key_patterns: Vec::new(),
            main_dependencies: Vec::new(),
            architecture_notes: None,
        });
    }

    record
}
