//! Persistence layer for run history

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteRunStore;

use crate::core::ProcessResult;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run id (the result's process id)
    pub run_id: Uuid,

    /// Workflow name
    pub workflow: String,

    /// Whether the run completed
    pub success: bool,

    /// Terminal error, if the run aborted
    pub error: Option<String>,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished or aborted
    pub finished_at: DateTime<Utc>,

    /// Wall time in milliseconds
    pub duration_ms: i64,

    /// Number of artifacts in the terminal ledger view
    pub artifact_count: usize,
}

/// Trait for persistence backends
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Save a run summary
    async fn save_run(&self, run: &RunSummary) -> Result<()>;

    /// Load a run by id
    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>>;

    /// List all runs of one workflow
    async fn list_runs(&self, workflow: &str) -> Result<Vec<RunSummary>>;

    /// List all workflow names with recorded runs
    async fn list_workflows(&self) -> Result<Vec<String>>;
}

/// In-memory persistence (for testing or ephemeral use)
pub struct InMemoryPersistence {
    runs: tokio::sync::RwLock<std::collections::HashMap<Uuid, RunSummary>>,
    by_workflow: tokio::sync::RwLock<std::collections::HashMap<String, Vec<Uuid>>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self {
            runs: tokio::sync::RwLock::new(std::collections::HashMap::new()),
            by_workflow: tokio::sync::RwLock::new(std::collections::HashMap::new()),
        }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for InMemoryPersistence {
    async fn save_run(&self, run: &RunSummary) -> Result<()> {
        let mut runs = self.runs.write().await;
        runs.insert(run.run_id, run.clone());

        let mut by_workflow = self.by_workflow.write().await;
        by_workflow
            .entry(run.workflow.clone())
            .or_insert_with(Vec::new)
            .push(run.run_id);

        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        let runs = self.runs.read().await;
        Ok(runs.get(&run_id).cloned())
    }

    async fn list_runs(&self, workflow: &str) -> Result<Vec<RunSummary>> {
        let runs = self.runs.read().await;
        let by_workflow = self.by_workflow.read().await;

        if let Some(ids) = by_workflow.get(workflow) {
            let mut result = Vec::new();
            for id in ids {
                if let Some(run) = runs.get(id) {
                    result.push(run.clone());
                }
            }
            Ok(result)
        } else {
            Ok(Vec::new())
        }
    }

    async fn list_workflows(&self) -> Result<Vec<String>> {
        let by_workflow = self.by_workflow.read().await;
        Ok(by_workflow.keys().cloned().collect())
    }
}

/// Create a summary from a terminal process result
pub fn create_summary(result: &ProcessResult) -> RunSummary {
    RunSummary {
        run_id: result.metadata.process_id,
        workflow: result.metadata.workflow.clone(),
        success: result.success,
        error: result.error.clone(),
        started_at: result.metadata.started_at,
        finished_at: result.metadata.finished_at,
        duration_ms: result.duration_ms,
        artifact_count: result.artifacts.len(),
    }
}
