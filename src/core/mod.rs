//! Core domain models for the pipeline runner
//!
//! This module defines the fundamental data structures: schema contracts,
//! task definitions, artifacts, pipeline state, the breakpoint gate, and
//! the terminal process result.

pub mod artifact;
pub mod breakpoint;
pub mod pipeline;
pub mod process;
pub mod result;
pub mod schema;
pub mod state;
pub mod task;

pub use artifact::{Artifact, ArtifactLedger, ArtifactView, DEFAULT_ARTIFACT_FORMAT};
pub use breakpoint::{BreakpointContext, BreakpointRequest, GatePrompt, ResumeDecision};
pub use pipeline::{Gate, Pipeline, PipelineBuilder, PipelineError, PipelineStep};
pub use process::{ProcessResult, RunError, RunMetadata};
pub use result::{StepOutput, StepResult};
pub use schema::{FieldKind, FieldSpec, SchemaContract, SchemaError};
pub use state::{PipelineState, RunStatus};
pub use task::{InvocationKind, InvocationSpec, TaskDefinition};
