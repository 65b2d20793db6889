//! End-to-end pipeline tests against mock collaborators.

mod common;

use common::{MockProvider, MockReply, MockStore, FENCED_REPLY};

use code_lens::analyze::{run_analysis, AnalysisRequest, AnalyzeError};
use code_lens::models::SizeTier;
use code_lens::provider::ProviderError;

fn request(code: &str, user: Option<&str>) -> AnalysisRequest {
    AnalysisRequest {
        code: code.to_string(),
        language: Some("rust".to_string()),
        user_id: user.map(|u| u.to_string()),
    }
}

fn source_of(lines: usize) -> String {
    vec!["fn noop() {}"; lines].join("\n")
}

#[tokio::test]
async fn test_missing_user_never_reaches_the_provider() {
    let provider = MockProvider::new(MockReply::Text(FENCED_REPLY));
    let store = MockStore::new();

    let result = run_analysis(&provider, &store, request("fn main() {}", None)).await;

    assert!(matches!(result, Err(AnalyzeError::MissingUser)));
    assert_eq!(provider.call_count(), 0);
    assert!(store.inserted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_code_is_rejected_first() {
    let provider = MockProvider::new(MockReply::Text(FENCED_REPLY));
    let store = MockStore::new();

    // Code is checked before the user id, matching the HTTP contract
    // (400 before 401).
    let result = run_analysis(&provider, &store, request("", None)).await;

    assert!(matches!(result, Err(AnalyzeError::MissingCode)));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_standard_analysis_end_to_end() {
    let provider = MockProvider::new(MockReply::Text(FENCED_REPLY));
    let store = MockStore::new();

    let outcome = run_analysis(&provider, &store, request("fn main() {}", Some("alice")))
        .await
        .unwrap();

    assert_eq!(outcome.id, "id-1");
    assert_eq!(outcome.tier, SizeTier::Standard);
    assert_eq!(outcome.line_count, 1);
    assert_eq!(outcome.analysis.explanation, "Computes a running total");
    assert_eq!(outcome.analysis.line_by_line.len(), 1);
    assert!(outcome.analysis.sections.is_empty());

    // 100 - 5 (one medium issue) + 10 (high readability) + 18
    // (maintainability 9 × 2) = 123 → clamped.
    assert_eq!(outcome.quality.score, 100);
    assert_eq!(outcome.quality.breakdown.issues_penalty, 5);
    assert_eq!(outcome.quality.breakdown.maintainability_score, 18);

    // Standard tier gets the per-line schema and the small budget.
    assert_eq!(provider.budgets.lock().unwrap()[0], 16_384);
    assert!(provider.systems.lock().unwrap()[0].contains("lineByLine"));

    let inserted = store.inserted.lock().unwrap();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].user_id, "alice");
    assert_eq!(inserted[0].language, "rust");
    assert_eq!(inserted[0].record.explanation, "Computes a running total");
}

#[tokio::test]
async fn test_missing_language_defaults_to_unknown_in_storage() {
    let provider = MockProvider::new(MockReply::Text(FENCED_REPLY));
    let store = MockStore::new();

    let mut req = request("fn main() {}", Some("alice"));
    req.language = None;
    run_analysis(&provider, &store, req).await.unwrap();

    assert_eq!(store.inserted.lock().unwrap()[0].language, "unknown");
}

#[tokio::test]
async fn test_very_large_input_uses_section_schema_and_fallback() {
    let provider = MockProvider::new(MockReply::Text("I refuse to produce JSON."));
    let store = MockStore::new();

    let outcome = run_analysis(&provider, &store, request(&source_of(2500), Some("bob")))
        .await
        .unwrap();

    assert_eq!(outcome.tier, SizeTier::VeryLarge);
    assert_eq!(outcome.line_count, 2500);

    // The very-large schema and budget were selected.
    assert_eq!(provider.budgets.lock().unwrap()[0], 32_768);
    assert!(provider.systems.lock().unwrap()[0].contains("architectureNotes"));

    // Non-JSON output degraded to the large-file fallback record.
    assert_eq!(outcome.analysis.explanation, "I refuse to produce JSON.");
    assert!(outcome.analysis.line_by_line.is_empty());
    assert!(outcome.analysis.sections.is_empty());
    let summary = outcome.analysis.summary.as_ref().unwrap();
    assert_eq!(summary.lines_of_code, 2500);

    // The fallback rating still yields a deterministic score.
    assert_eq!(outcome.quality.score, 100);
    assert_eq!(outcome.quality.breakdown.complexity_penalty, 5);
}

#[tokio::test]
async fn test_large_tier_selected_at_boundary() {
    let provider = MockProvider::new(MockReply::Text(FENCED_REPLY));
    let store = MockStore::new();

    let outcome = run_analysis(&provider, &store, request(&source_of(500), Some("bob")))
        .await
        .unwrap();

    assert_eq!(outcome.tier, SizeTier::Large);
    assert_eq!(provider.budgets.lock().unwrap()[0], 24_576);

    // The reply carried lineByLine, but a Large record must not.
    assert!(outcome.analysis.line_by_line.is_empty());
}

#[tokio::test]
async fn test_provider_rate_limit_propagates() {
    let provider = MockProvider::new(MockReply::RateLimited);
    let store = MockStore::new();

    let result = run_analysis(&provider, &store, request("fn main() {}", Some("carol"))).await;

    assert!(matches!(
        result,
        Err(AnalyzeError::Provider(ProviderError::RateLimited))
    ));
    assert!(store.inserted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_persistence_failure_degrades_to_fallback_id() {
    let provider = MockProvider::new(MockReply::Text(FENCED_REPLY));
    let store = MockStore::failing();

    let outcome = run_analysis(&provider, &store, request("fn main() {}", Some("dave")))
        .await
        .unwrap();

    // The write failed, but the analysis result is still returned with
    // a synthesized identifier.
    assert!(outcome.id.starts_with("unsaved-"));
    assert_eq!(outcome.analysis.explanation, "Computes a running total");
    assert_eq!(outcome.quality.score, 100);
}
