//! HTTP server for the analysis service.
//!
//! Exposes the pipeline over a JSON API suitable for browser-based
//! frontends.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/analyze` | Run the full analysis pipeline |
//! | `GET`  | `/history` | List a user's stored analyses |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Failures are `{ "error": "...", "details": "..." }` with a non-2xx
//! status: 400 missing code, 401 missing user, 429 upstream rate limit,
//! 402 upstream quota exhaustion, 500 otherwise. Malformed model output
//! is not an error — it degrades to a fallback record and a 200.
//!
//! # CORS
//!
//! Any origin is permitted; allowed headers are `authorization`,
//! `x-client-info`, `apikey`, and `content-type`, so hosted frontends
//! can call the API directly and preflights succeed.

use axum::{
    extract::{Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::analyze::{run_analysis, AnalysisRequest, AnalyzeError};
use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::{AnalysisRecord, ScoreBreakdown};
use crate::provider::{GatewayProvider, ModelProvider, ProviderError};
use crate::store::{AnalysisStore, HistoryEntry, SqliteStore};

/// Shared application state passed to all route handlers. The provider
/// and store are trait objects so tests can substitute mocks.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ModelProvider>,
    pub store: Arc<dyn AnalysisStore>,
}

/// Starts the HTTP server with the configured gateway provider and
/// SQLite store. Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let provider = GatewayProvider::new(&config.provider)?;

    let pool = db::connect(&config.db.path).await?;
    migrate::apply_schema(&pool).await?;

    let state = AppState {
        provider: Arc::new(provider),
        store: Arc::new(SqliteStore::new(pool)),
    };

    let app = build_router(state);

    println!("Code Lens listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router for the given state. Split out so tests can mount
/// the same routes on an ephemeral listener with mock collaborators.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    Router::new()
        .route("/analyze", post(handle_analyze))
        .route("/history", get(handle_history))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

/// JSON error body: `{ "error": "...", "details": "..." }`.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    fn internal(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            details,
        }
    }
}

/// Map the pipeline's tagged errors onto the status-code taxonomy,
/// preserving recognizable upstream statuses (429, 402).
impl From<AnalyzeError> for AppError {
    fn from(err: AnalyzeError) -> Self {
        let status = match &err {
            AnalyzeError::MissingCode => StatusCode::BAD_REQUEST,
            AnalyzeError::MissingUser => StatusCode::UNAUTHORIZED,
            AnalyzeError::Provider(ProviderError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            AnalyzeError::Provider(ProviderError::QuotaExhausted) => StatusCode::PAYMENT_REQUIRED,
            AnalyzeError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let details = match &err {
            AnalyzeError::Provider(ProviderError::Upstream { body, .. }) if !body.is_empty() => {
                Some(body.clone())
            }
            _ => None,
        };

        Self {
            status,
            message: err.to_string(),
            details,
        }
    }
}

// ============ POST /analyze ============

/// JSON request body for `POST /analyze`. Fields are optional here so
/// validation can answer with the right status instead of a generic
/// deserialization rejection.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

/// JSON response body for `POST /analyze`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    id: String,
    analysis: AnalysisRecord,
    quality_score: i64,
    score_breakdown: ScoreBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_large_file: Option<bool>,
    line_count: usize,
}

async fn handle_analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeBody>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let request = AnalysisRequest {
        code: body.code.unwrap_or_default(),
        language: body.language,
        user_id: body.user_id,
    };

    let outcome = run_analysis(state.provider.as_ref(), state.store.as_ref(), request).await?;

    Ok(Json(AnalyzeResponse {
        id: outcome.id,
        analysis: outcome.analysis,
        quality_score: outcome.quality.score,
        score_breakdown: outcome.quality.breakdown,
        is_large_file: outcome.tier.is_large().then_some(true),
        line_count: outcome.line_count,
    }))
}

// ============ GET /history ============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryParams {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Serialize)]
struct HistoryResponse {
    analyses: Vec<HistoryEntry>,
}

async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, AppError> {
    let user_id = match params.user_id.as_deref() {
        Some(user_id) if !user_id.is_empty() => user_id,
        _ => {
            return Err(AppError {
                status: StatusCode::UNAUTHORIZED,
                message: "User is required".to_string(),
                details: None,
            })
        }
    };

    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    let analyses = state
        .store
        .history(user_id, limit)
        .await
        .map_err(|e| AppError::internal("Failed to load history", Some(e.to_string())))?;

    Ok(Json(HistoryResponse { analyses }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
