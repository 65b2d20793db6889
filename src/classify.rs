//! Input size classification.
//!
//! Maps a source text's line count to a [`SizeTier`]. The tier is
//! computed once per request and drives both the response schema the
//! model is asked for and the token budget (see [`crate::prompt`]).

use crate::models::SizeTier;

/// Inputs at or above this many lines use the section-based schema.
pub const LARGE_THRESHOLD: usize = 500;
/// Inputs at or above this many lines additionally request
/// architecture notes and high-severity-only issue reporting.
pub const VERY_LARGE_THRESHOLD: usize = 2000;

/// Classify source text by line count.
///
/// Pure and total: the line count is the number of `'\n'`-separated
/// segments, so an empty string counts as one line and the result is
/// the same for every call with the same input.
pub fn classify(source: &str) -> (usize, SizeTier) {
    let line_count = source.split('\n').count();
    (line_count, tier_for_lines(line_count))
}

/// Tier boundaries: Standard < 500 ≤ Large < 2000 ≤ VeryLarge.
pub fn tier_for_lines(line_count: usize) -> SizeTier {
    if line_count >= VERY_LARGE_THRESHOLD {
        SizeTier::VeryLarge
    } else if line_count >= LARGE_THRESHOLD {
        SizeTier::Large
    } else {
        SizeTier::Standard
    }
}
