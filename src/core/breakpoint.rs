//! Breakpoint gate types - suspension for human review

use crate::core::artifact::ArtifactView;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Title, question, and summary a gate builder derives from pipeline state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatePrompt {
    /// Short heading for the review surface
    pub title: String,

    /// The question put to the reviewer, with computed figures interpolated
    pub question: String,

    /// Domain summary backing the question
    pub summary: Value,
}

/// Read-only snapshot handed to the external reviewer
///
/// Derived deterministically from PipelineState at the moment of the gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakpointRequest {
    pub title: String,
    pub question: String,
    pub context: BreakpointContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakpointContext {
    pub run_id: Uuid,

    /// Ledger view accumulated strictly before the gate
    pub files: Vec<ArtifactView>,

    pub summary: Value,
}

/// What the reviewer decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ResumeDecision {
    /// Continue with the remaining steps
    Approve,

    /// Abort the run
    Reject { reason: String },

    /// Merge-patch the run configuration, then continue
    Modify { patch: Value },
}
