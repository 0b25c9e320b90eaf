//! SQLite-based persistence store

use crate::persistence::{PersistenceBackend, RunSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// SQLite run store
pub struct SqliteRunStore {
    pool: SqlitePool,
}

impl SqliteRunStore {
    /// Create a new SQLite store
    pub async fn new(db_path: &str) -> Result<Self> {
        let pool = SqlitePool::connect(&format!("sqlite:{}", db_path))
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init().await?;

        Ok(store)
    }

    /// Create store with default path
    pub async fn with_default_path() -> Result<Self> {
        let data_dir = dirs::data_local_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
        let db_dir = data_dir.join("atelier");
        std::fs::create_dir_all(&db_dir)?;

        let db_path = db_dir.join("runs.db");
        Self::new(db_path.to_str().context("Non-UTF8 database path")?).await
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id TEXT PRIMARY KEY,
                workflow TEXT NOT NULL,
                success INTEGER NOT NULL,
                error TEXT,
                started_at TEXT NOT NULL,
                finished_at TEXT NOT NULL,
                duration_ms INTEGER NOT NULL DEFAULT 0,
                artifact_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_workflow ON runs(workflow);
            CREATE INDEX IF NOT EXISTS idx_started_at ON runs(started_at);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Convert DateTime<Utc> to NaiveDateTime for SQLite
    fn to_naive(dt: DateTime<Utc>) -> NaiveDateTime {
        dt.naive_utc()
    }

    /// Convert NaiveDateTime to DateTime<Utc>
    fn from_naive(dt: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(dt, Utc)
    }

    fn row_to_summary(row: &sqlx::sqlite::SqliteRow) -> Result<RunSummary> {
        Ok(RunSummary {
            run_id: Uuid::parse_str(&row.get::<String, _>("id"))?,
            workflow: row.get("workflow"),
            success: row.get::<i64, _>("success") != 0,
            error: row.get("error"),
            started_at: Self::from_naive(row.get("started_at")),
            finished_at: Self::from_naive(row.get("finished_at")),
            duration_ms: row.get("duration_ms"),
            artifact_count: row.get::<i64, _>("artifact_count") as usize,
        })
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for SqliteRunStore {
    async fn save_run(&self, run: &RunSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO runs
            (id, workflow, success, error, started_at, finished_at, duration_ms, artifact_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(run.run_id.to_string())
        .bind(&run.workflow)
        .bind(run.success as i64)
        .bind(&run.error)
        .bind(Self::to_naive(run.started_at))
        .bind(Self::to_naive(run.finished_at))
        .bind(run.duration_ms)
        .bind(run.artifact_count as i64)
        .execute(&self.pool)
        .await
        .context("Failed to save run")?;

        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        let row = sqlx::query(
            r#"
            SELECT id, workflow, success, error, started_at, finished_at, duration_ms, artifact_count
            FROM runs
            WHERE id = ?1
            "#,
        )
        .bind(run_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load run")?;

        row.as_ref().map(Self::row_to_summary).transpose()
    }

    async fn list_runs(&self, workflow: &str) -> Result<Vec<RunSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, workflow, success, error, started_at, finished_at, duration_ms, artifact_count
            FROM runs
            WHERE workflow = ?1
            ORDER BY started_at DESC
            "#,
        )
        .bind(workflow)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list runs")?;

        rows.iter().map(Self::row_to_summary).collect()
    }

    async fn list_workflows(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT workflow
            FROM runs
            ORDER BY workflow ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list workflows")?;

        Ok(rows.iter().map(|row| row.get("workflow")).collect())
    }
}
