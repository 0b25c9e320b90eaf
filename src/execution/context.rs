//! Execution context - the only side-effecting surface the pipeline touches

use crate::core::{BreakpointRequest, ResumeDecision, StepResult, TaskDefinition};
use crate::execution::clock::{Clock, SystemClock};
use crate::invoker::{BreakpointInvoker, InvokeError, TaskInvoker};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

/// Process-wide handle for one run: clock, invokers, run id, cancellation
///
/// `task()` and `breakpoint()` are the run's only suspension points. Both
/// check the cancellation flag before and after the call, so a result that
/// arrives after cancellation is simply discarded.
pub struct ExecutionContext {
    run_id: Uuid,
    clock: Arc<dyn Clock>,
    invoker: Arc<dyn TaskInvoker>,
    gate: Arc<dyn BreakpointInvoker>,
    cancelled: Arc<AtomicBool>,
}

impl ExecutionContext {
    pub fn new(invoker: Arc<dyn TaskInvoker>, gate: Arc<dyn BreakpointInvoker>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            clock: Arc::new(SystemClock),
            invoker,
            gate,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use a fixed run id (reruns, tests)
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    /// Use an injected clock (tests)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Share a caller-owned cancellation flag
    pub fn with_cancellation_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = flag;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Flag that aborts this run when raised from another task
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run-unique invocation id for one step
    ///
    /// Keeps the `tasks/<invocation_id>/...` convention collision-free
    /// across concurrent runs.
    pub fn invocation_id(&self, step_name: &str) -> String {
        format!("{}/{}", self.run_id, step_name)
    }

    /// Fire-and-forget logging; never blocks, never fails the run
    pub fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(run_id = %self.run_id, "{}", message),
            Level::WARN => tracing::warn!(run_id = %self.run_id, "{}", message),
            Level::INFO => tracing::info!(run_id = %self.run_id, "{}", message),
            Level::DEBUG => tracing::debug!(run_id = %self.run_id, "{}", message),
            Level::TRACE => tracing::trace!(run_id = %self.run_id, "{}", message),
        }
    }

    /// Resolve one invocation through the external invoker
    ///
    /// Returns `None` when the run was cancelled before or during the
    /// call; an in-flight result is discarded in that case.
    pub async fn task(
        &self,
        definition: &TaskDefinition,
        args: &Value,
    ) -> Option<Result<StepResult, InvokeError>> {
        if self.is_cancelled() {
            return None;
        }

        let invocation_id = self.invocation_id(definition.name());
        let spec = definition.build(args, &invocation_id);
        let result = self.invoker.invoke(&spec).await;

        if self.is_cancelled() {
            return None;
        }
        Some(result)
    }

    /// Suspend for human review; blocks until the reviewer decides
    ///
    /// No implicit timeout. Returns `None` when the run was cancelled.
    pub async fn breakpoint(
        &self,
        request: BreakpointRequest,
    ) -> Option<Result<ResumeDecision, InvokeError>> {
        if self.is_cancelled() {
            return None;
        }

        let result = self.gate.present(request).await;

        if self.is_cancelled() {
            return None;
        }
        Some(result)
    }
}
