//! The workflow library - arts-and-culture pipelines as data
//!
//! Each module instantiates the generic [`Pipeline`] with its own steps,
//! contracts, gate, and terminal payload. Control flow lives in
//! `execution`; nothing here is more than configuration.

pub mod budgeting;
pub mod conservation;
pub mod curatorial;
pub mod events;
pub mod exhibition;
pub mod loans;
pub mod visitor;

use crate::core::{Pipeline, PipelineError, ProcessResult};
use crate::execution::{ExecutionContext, PipelineRunner};
use serde_json::Value;
use thiserror::Error;

/// Names of every registered workflow, in menu order
pub const WORKFLOWS: &[&str] = &[
    "budgeting",
    "conservation",
    "curatorial",
    "events",
    "exhibition",
    "loans",
    "visitor",
];

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("unknown workflow '{0}'")]
    Unknown(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Build the pipeline for a workflow by name
pub fn pipeline(name: &str) -> Result<Pipeline, WorkflowError> {
    match name {
        "budgeting" => Ok(budgeting::pipeline()?),
        "conservation" => Ok(conservation::pipeline()?),
        "curatorial" => Ok(curatorial::pipeline()?),
        "events" => Ok(events::pipeline()?),
        "exhibition" => Ok(exhibition::pipeline()?),
        "loans" => Ok(loans::pipeline()?),
        "visitor" => Ok(visitor::pipeline()?),
        other => Err(WorkflowError::Unknown(other.to_string())),
    }
}

/// Run a workflow by name
///
/// The runner is caller-supplied so event handlers survive across runs.
pub async fn run(
    runner: &PipelineRunner,
    name: &str,
    config: Value,
    ctx: &ExecutionContext,
) -> Result<ProcessResult, WorkflowError> {
    match name {
        "budgeting" => budgeting::run(runner, config, ctx).await,
        "conservation" => conservation::run(runner, config, ctx).await,
        "curatorial" => curatorial::run(runner, config, ctx).await,
        "events" => events::run(runner, config, ctx).await,
        "exhibition" => exhibition::run(runner, config, ctx).await,
        "loans" => loans::run(runner, config, ctx).await,
        "visitor" => visitor::run(runner, config, ctx).await,
        other => Err(WorkflowError::Unknown(other.to_string())),
    }
}

/// Render a monetary or count figure the way gate questions quote it
///
/// Whole numbers print without a fractional part, so a 40000.0 surplus
/// reads "40000", not "40000.0".
pub(crate) fn amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

pub(crate) fn default_output_dir() -> String {
    "./workspace".to_string()
}
