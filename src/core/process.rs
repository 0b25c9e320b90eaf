//! Terminal process results and the run error taxonomy

use crate::core::artifact::ArtifactView;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

/// Why a run aborted
#[derive(Debug, Error)]
pub enum RunError {
    /// A step result explicitly signalled non-success
    #[error("step '{step}' failed: {error}")]
    StepFailure {
        step: String,
        error: String,
        details: Option<Value>,
    },

    /// A step result did not conform to its schema contract
    #[error("step '{step}' violated its result contract: {message}")]
    SchemaViolation { step: String, message: String },

    /// The external invoker could not complete the call
    #[error("step '{step}' invocation failed: {message}")]
    InvocationFailure { step: String, message: String },

    /// The reviewer declined to proceed at the gate
    #[error("rejected at breakpoint: {reason}")]
    BreakpointRejection { reason: String },

    /// The run's cancellation flag was raised
    #[error("run cancelled")]
    Cancelled,
}

impl RunError {
    /// Structured details for the terminal result
    pub fn details(&self) -> Value {
        match self {
            RunError::StepFailure { step, details, .. } => json!({
                "kind": "step_failure",
                "step": step,
                "details": details.clone().unwrap_or(Value::Null),
            }),
            RunError::SchemaViolation { step, message } => json!({
                "kind": "schema_violation",
                "step": step,
                "message": message,
            }),
            RunError::InvocationFailure { step, message } => json!({
                "kind": "invocation_failure",
                "step": step,
                "message": message,
            }),
            RunError::BreakpointRejection { reason } => json!({
                "kind": "breakpoint_rejection",
                "reason": reason,
            }),
            RunError::Cancelled => json!({ "kind": "cancelled" }),
        }
    }
}

/// Fixed metadata echoed back with every terminal result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub process_id: Uuid,
    pub workflow: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// The caller's effective configuration, defaults applied
    pub config: Value,
}

/// The terminal, immutable outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    pub success: bool,

    /// Domain payload assembled by the workflow; null on failure
    pub payload: Value,

    /// Full ordered artifact ledger view; empty on failure
    pub artifacts: Vec<ArtifactView>,

    pub duration_ms: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,

    pub metadata: RunMetadata,
}

impl ProcessResult {
    pub fn completed(
        payload: Value,
        artifacts: Vec<ArtifactView>,
        metadata: RunMetadata,
    ) -> Self {
        let duration_ms = (metadata.finished_at - metadata.started_at).num_milliseconds();
        Self {
            success: true,
            payload,
            artifacts,
            duration_ms,
            error: None,
            details: None,
            metadata,
        }
    }

    /// Accumulated state is discarded; the result carries only the error
    pub fn aborted(error: &RunError, metadata: RunMetadata) -> Self {
        let duration_ms = (metadata.finished_at - metadata.started_at).num_milliseconds();
        Self {
            success: false,
            payload: Value::Null,
            artifacts: Vec::new(),
            duration_ms,
            error: Some(error.to_string()),
            details: Some(error.details()),
            metadata,
        }
    }
}
