//! Model gateway abstraction and implementation.
//!
//! Defines the [`ModelProvider`] trait and the concrete
//! [`GatewayProvider`], which calls an OpenAI-compatible chat
//! completions endpoint. The gateway's model identifier is resolved
//! once per process through a [`ModelSlot`] — a single-slot memoized
//! cache with get-or-populate semantics and no expiry. The slot is
//! owned by the provider instance, so tests get a fresh one per
//! provider and production gets process-lifetime reuse.
//!
//! No retries are attempted here: upstream rate limits and quota
//! exhaustion surface to the caller with their status preserved.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::ProviderConfig;

/// Failure modes of a gateway call, tagged so the HTTP layer can map
/// recognizable upstream statuses through to the caller.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("AI credits depleted. Please add credits to continue.")]
    QuotaExhausted,
    #[error("AI gateway error {status}")]
    Upstream { status: u16, body: String },
    #[error("AI gateway transport error: {0}")]
    Transport(String),
    #[error("No response from AI")]
    EmptyCompletion,
}

/// Boundary to the hosted LLM.
///
/// `generate` sends a system/user message pair with a completion token
/// budget and returns the raw model text. Implementations must not
/// parse or reshape the text; that is the normalizer's job.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError>;
}

/// Single-slot memoized value with get-or-populate semantics.
///
/// The first caller populates the slot; later callers reuse the value
/// without re-running the lookup. Rewriting with an equivalent value
/// under a first-use race is harmless, and a populate failure leaves
/// the slot empty so the next request tries again.
pub struct ModelSlot {
    inner: Mutex<Option<String>>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    pub async fn get_or_populate<F, Fut>(&self, populate: F) -> Result<String, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, ProviderError>>,
    {
        let mut slot = self.inner.lock().await;
        if let Some(value) = slot.as_ref() {
            return Ok(value.clone());
        }
        let value = populate().await?;
        *slot = Some(value.clone());
        Ok(value)
    }
}

impl Default for ModelSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Provider backed by an OpenAI-compatible gateway.
///
/// Calls `POST {url}/v1/chat/completions` with bearer auth. When no
/// model is configured, the first id returned by `GET {url}/v1/models`
/// is used and memoized for the life of the process.
pub struct GatewayProvider {
    client: reqwest::Client,
    url: String,
    api_key: String,
    configured_model: Option<String>,
    model_slot: ModelSlot,
}

impl GatewayProvider {
    /// Create a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key environment variable named in
    /// the config is not set, or the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", config.api_key_env))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            api_key,
            configured_model: config.model.clone(),
            model_slot: ModelSlot::new(),
        })
    }

    /// Resolve the model identifier, memoized in the slot.
    async fn resolve_model(&self) -> Result<String, ProviderError> {
        self.model_slot
            .get_or_populate(|| async {
                if let Some(model) = &self.configured_model {
                    return Ok(model.clone());
                }
                self.discover_model().await
            })
            .await
    }

    /// Ask the gateway which models are available and take the first.
    async fn discover_model(&self) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v1/models", self.url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), body));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        json.get("data")
            .and_then(|d| d.as_array())
            .and_then(|models| models.first())
            .and_then(|m| m.get("id"))
            .and_then(|id| id.as_str())
            .map(|id| id.to_string())
            .ok_or(ProviderError::EmptyCompletion)
    }
}

#[async_trait]
impl ModelProvider for GatewayProvider {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let model = self.resolve_model().await?;

        let body = serde_json::json!({
            "model": model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            eprintln!("AI gateway error: {} {}", status, body_text);
            return Err(classify_status(status.as_u16(), body_text));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        json.get("choices")
            .and_then(|c| c.as_array())
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(|content| content.to_string())
            .ok_or(ProviderError::EmptyCompletion)
    }
}

/// Map a non-2xx upstream status to the tagged error taxonomy.
fn classify_status(status: u16, body: String) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited,
        402 => ProviderError::QuotaExhausted,
        _ => ProviderError::Upstream { status, body },
    }
}
