//! The analysis pipeline.
//!
//! One linear pass shared by the CLI and the HTTP server:
//! validate → classify → select prompt → invoke → normalize → score →
//! persist → assemble. There is no branching on retries and no
//! cancellation; a request runs to completion or to a terminal failure.
//!
//! Only validation and provider failures are fatal. Malformed model
//! output degrades to the normalizer's fallback record, and a storage
//! failure degrades to a synthesized identifier — in both cases the
//! caller still receives the computed analysis.

use chrono::Utc;
use thiserror::Error;

use crate::classify::classify;
use crate::models::{AnalysisRecord, QualityScore, SizeTier};
use crate::normalize::normalize;
use crate::prompt::{select_prompt, user_message};
use crate::provider::{ModelProvider, ProviderError};
use crate::score::score;
use crate::store::{AnalysisStore, NewAnalysis};

/// Incoming analysis request. `language` and `user_id` arrive as the
/// caller sent them; validation decides what is missing.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub code: String,
    pub language: Option<String>,
    pub user_id: Option<String>,
}

/// Fatal pipeline failures. Everything else degrades to a best-effort
/// success.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Code is required")]
    MissingCode,
    #[error("User is required")]
    MissingUser,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Everything the pipeline produced for one request.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub id: String,
    pub analysis: AnalysisRecord,
    pub quality: QualityScore,
    pub tier: SizeTier,
    pub line_count: usize,
}

/// Run the full pipeline for one request.
///
/// Validation failures return before any provider call. Provider
/// failures propagate with their upstream status intact. A persistence
/// failure is logged and replaced with a timestamp-derived fallback id
/// so the computed result is still returned.
pub async fn run_analysis(
    provider: &dyn ModelProvider,
    store: &dyn AnalysisStore,
    request: AnalysisRequest,
) -> Result<AnalysisOutcome, AnalyzeError> {
    if request.code.is_empty() {
        return Err(AnalyzeError::MissingCode);
    }
    let user_id = match request.user_id.as_deref() {
        Some(user_id) if !user_id.is_empty() => user_id.to_string(),
        _ => return Err(AnalyzeError::MissingUser),
    };

    let (line_count, tier) = classify(&request.code);
    let plan = select_prompt(tier, line_count);

    println!(
        "Analyzing {} lines ({:?} tier, {} token budget)...",
        line_count, tier, plan.token_budget
    );

    let raw = provider
        .generate(
            &plan.system,
            &user_message(request.language.as_deref(), &request.code),
            plan.token_budget,
        )
        .await?;

    let analysis = normalize(&raw, tier, line_count);
    let quality = score(&analysis);

    let language = request
        .language
        .unwrap_or_else(|| "unknown".to_string());

    let id = match store
        .insert(NewAnalysis {
            user_id,
            language,
            code_text: request.code,
            line_count,
            record: analysis.clone(),
        })
        .await
    {
        Ok(id) => id,
        Err(err) => {
            eprintln!("Failed to persist analysis: {err:#}");
            fallback_id()
        }
    };

    println!("Analysis completed (score {})", quality.score);

    Ok(AnalysisOutcome {
        id,
        analysis,
        quality,
        tier,
        line_count,
    })
}

/// Identifier handed back when storage fails. Timestamp-derived so the
/// caller still gets a usable, roughly-unique reference.
fn fallback_id() -> String {
    format!("unsaved-{}", Utc::now().timestamp_millis())
}
