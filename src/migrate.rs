use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Create the schema, connecting to the configured database.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(&config.db.path).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Idempotent schema creation for an already-open pool.
///
/// The `analyses` table matches the persistence collaborator contract:
/// the full normalized record as JSON in `ai_explanation`, with the
/// docstring and rating lifted into their own columns.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analyses (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            language TEXT NOT NULL DEFAULT 'unknown',
            code_text TEXT NOT NULL,
            ai_explanation TEXT NOT NULL,
            ai_docstring TEXT,
            ai_rating TEXT,
            line_count INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_analyses_user_id ON analyses(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_analyses_created_at ON analyses(created_at DESC)")
        .execute(pool)
        .await?;

    Ok(())
}
