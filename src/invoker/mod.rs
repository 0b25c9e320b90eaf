//! External invoker ports - how delegated work actually gets done

pub mod error;
pub mod subprocess;

use crate::core::{BreakpointRequest, InvocationSpec, ResumeDecision, StepResult};
use async_trait::async_trait;
pub use error::InvokeError;
pub use subprocess::{InvokerConfig, SubprocessInvoker};

/// Resolves one invocation - allows for different backends
///
/// Implementations must validate the raw result against the invocation's
/// schema contract before returning it ([`StepResult::parse`] does both).
#[async_trait]
pub trait TaskInvoker: Send + Sync {
    async fn invoke(&self, spec: &InvocationSpec) -> Result<StepResult, InvokeError>;
}

/// Presents a breakpoint to an external reviewer and blocks for a decision
///
/// No implicit timeout: the pipeline waits as long as the reviewer takes.
#[async_trait]
pub trait BreakpointInvoker: Send + Sync {
    async fn present(&self, request: BreakpointRequest) -> Result<ResumeDecision, InvokeError>;
}

/// Gate that approves everything, for unattended runs
#[derive(Debug, Clone, Default)]
pub struct AutoApproveGate;

#[async_trait]
impl BreakpointInvoker for AutoApproveGate {
    async fn present(&self, request: BreakpointRequest) -> Result<ResumeDecision, InvokeError> {
        tracing::info!("Auto-approving breakpoint: {}", request.title);
        Ok(ResumeDecision::Approve)
    }
}
