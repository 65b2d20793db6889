//! Analysis persistence.
//!
//! The [`AnalysisStore`] trait is the boundary the pipeline hands
//! finished records to; [`SqliteStore`] is the shipped implementation.
//! The pipeline treats storage as best-effort — a write failure must
//! never lose the computed analysis (see [`crate::analyze`]).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::AnalysisRecord;

/// A record ready to be persisted, keyed by user.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub user_id: String,
    pub language: String,
    pub code_text: String,
    pub line_count: usize,
    pub record: AnalysisRecord,
}

/// A stored analysis read back for history listings, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub language: String,
    pub code_text: String,
    pub line_count: i64,
    /// ISO8601 creation time.
    pub created_at: String,
    pub analysis: AnalysisRecord,
}

/// Storage boundary for finished analyses.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persist a record and return its generated identifier.
    async fn insert(&self, analysis: NewAnalysis) -> Result<String>;

    /// List a user's stored analyses, newest first.
    async fn history(&self, user_id: &str, limit: i64) -> Result<Vec<HistoryEntry>>;
}

/// SQLite-backed store over the `analyses` table.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for SqliteStore {
    async fn insert(&self, analysis: NewAnalysis) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let record_json = serde_json::to_string(&analysis.record)?;
        let rating_json = analysis
            .record
            .rating
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO analyses (id, user_id, language, code_text, ai_explanation, ai_docstring, ai_rating, line_count, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&analysis.user_id)
        .bind(&analysis.language)
        .bind(&analysis.code_text)
        .bind(&record_json)
        .bind(&analysis.record.docstring)
        .bind(&rating_json)
        .bind(analysis.line_count as i64)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn history(&self, user_id: &str, limit: i64) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, language, code_text, ai_explanation, line_count, created_at
            FROM analyses
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .iter()
            .map(|row| {
                let record_json: String = row.get("ai_explanation");
                let analysis: AnalysisRecord =
                    serde_json::from_str(&record_json).unwrap_or_default();
                let created_at: i64 = row.get("created_at");

                HistoryEntry {
                    id: row.get("id"),
                    language: row.get("language"),
                    code_text: row.get("code_text"),
                    line_count: row.get("line_count"),
                    created_at: format_ts_iso(created_at),
                    analysis,
                }
            })
            .collect();

        Ok(entries)
    }
}

fn format_ts_iso(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
