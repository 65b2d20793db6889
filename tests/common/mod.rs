//! Shared mock collaborators for the integration suites.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use code_lens::provider::{ModelProvider, ProviderError};
use code_lens::store::{AnalysisStore, HistoryEntry, NewAnalysis};

/// A well-formed Standard-tier model reply wrapped in a markdown fence.
pub const FENCED_REPLY: &str = r#"Here you go:
```json
{
  "explanation": "Computes a running total",
  "docstring": "/// Sums the input slice.",
  "rating": {"complexity": "low", "readability": "high", "maintainability": 9},
  "lineByLine": [{"line": 1, "content": "fn sum", "explanation": "entry point"}],
  "issues": [{"severity": "medium", "line": 3, "description": "shadowed variable", "suggestion": "rename it"}],
  "improvements": [{"title": "Use iterators", "description": "replace the index loop"}]
}
```"#;

/// What the mock provider should do when invoked.
pub enum MockReply {
    Text(&'static str),
    RateLimited,
    QuotaExhausted,
    Upstream { status: u16, body: &'static str },
}

/// Provider mock that records every invocation.
pub struct MockProvider {
    pub reply: MockReply,
    pub calls: AtomicUsize,
    pub systems: Mutex<Vec<String>>,
    pub budgets: Mutex<Vec<u32>>,
}

impl MockProvider {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            systems: Mutex::new(Vec::new()),
            budgets: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn generate(
        &self,
        system: &str,
        _user: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.systems.lock().unwrap().push(system.to_string());
        self.budgets.lock().unwrap().push(max_tokens);

        match &self.reply {
            MockReply::Text(text) => Ok(text.to_string()),
            MockReply::RateLimited => Err(ProviderError::RateLimited),
            MockReply::QuotaExhausted => Err(ProviderError::QuotaExhausted),
            MockReply::Upstream { status, body } => Err(ProviderError::Upstream {
                status: *status,
                body: body.to_string(),
            }),
        }
    }
}

/// Store mock. Captures inserts and hands out sequential ids, or fails
/// every write when `fail` is set.
pub struct MockStore {
    pub fail: bool,
    pub inserted: Mutex<Vec<NewAnalysis>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            fail: false,
            inserted: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            inserted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AnalysisStore for MockStore {
    async fn insert(&self, analysis: NewAnalysis) -> Result<String> {
        if self.fail {
            anyhow::bail!("storage unavailable");
        }
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push(analysis);
        Ok(format!("id-{}", inserted.len()))
    }

    async fn history(&self, _user_id: &str, _limit: i64) -> Result<Vec<HistoryEntry>> {
        Ok(Vec::new())
    }
}
