//! Pipeline sequencer - drives a run through its declared steps and gate

use crate::core::{
    BreakpointContext, BreakpointRequest, Pipeline, PipelineState, ProcessResult, ResumeDecision,
    RunError, RunMetadata, RunStatus, StepResult,
};
use crate::execution::context::ExecutionContext;
use crate::invoker::InvokeError;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that can occur during a pipeline run
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted {
        run_id: Uuid,
        workflow: String,
        total_steps: usize,
    },
    StepStarted {
        step: String,
        index: usize,
        total: usize,
    },
    StepCompleted {
        step: String,
        artifacts: usize,
    },
    StepFailed {
        step: String,
        error: String,
    },
    BreakpointRaised {
        title: String,
        question: String,
    },
    BreakpointResolved {
        decision: ResumeDecision,
    },
    RunCompleted {
        run_id: Uuid,
        success: bool,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(RunEvent) + Send + Sync>;

/// Drives pipelines through the sequencer state machine
///
/// `Idle → Running(i) → … → AwaitingApproval → … → Completed | Aborted`.
/// Steps run strictly in declared order; every step's result variant is
/// inspected the same way; the first failure aborts the run.
#[derive(Default)]
pub struct PipelineRunner {
    event_handlers: Mutex<Vec<EventHandler>>,
}

impl PipelineRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(RunEvent) + Send + Sync + 'static,
    {
        self.event_handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit(&self, event: RunEvent) {
        let handlers = self
            .event_handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for handler in handlers.iter() {
            handler(event.clone());
        }
    }

    /// Execute one run to its terminal result
    ///
    /// `config` is the caller's effective configuration (defaults already
    /// applied); it seeds `PipelineState` and is echoed back in the result
    /// metadata, including any gate edits.
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        config: Value,
        ctx: &ExecutionContext,
    ) -> ProcessResult {
        let run_id = ctx.run_id();
        let started_at = ctx.now();
        let mut state = PipelineState::new(run_id, config);

        info!("Starting run: {} ({})", pipeline.name(), run_id);
        self.emit(RunEvent::RunStarted {
            run_id,
            workflow: pipeline.name().to_string(),
            total_steps: pipeline.len(),
        });

        let outcome = self.drive(pipeline, &mut state, ctx).await;

        let finished_at = ctx.now();
        let metadata = RunMetadata {
            process_id: run_id,
            workflow: pipeline.name().to_string(),
            started_at,
            finished_at,
            config: state.config().clone(),
        };

        let result = match outcome {
            Ok(()) => {
                state.status = RunStatus::Completed;
                info!("Run completed: {} ({})", pipeline.name(), run_id);
                ProcessResult::completed(pipeline.finish(&state), state.ledger().view(), metadata)
            }
            Err(run_error) => {
                state.status = RunStatus::Aborted;
                error!("Run aborted: {} ({}): {}", pipeline.name(), run_id, run_error);
                ProcessResult::aborted(&run_error, metadata)
            }
        };

        self.emit(RunEvent::RunCompleted {
            run_id,
            success: result.success,
        });
        result
    }

    async fn drive(
        &self,
        pipeline: &Pipeline,
        state: &mut PipelineState,
        ctx: &ExecutionContext,
    ) -> Result<(), RunError> {
        let total = pipeline.len();

        for (index, step) in pipeline.steps().iter().enumerate() {
            state.status = RunStatus::Running(index);
            let name = step.name().to_string();

            self.emit(RunEvent::StepStarted {
                step: name.clone(),
                index,
                total,
            });
            info!("Executing step {}/{}: {}", index + 1, total, name);

            let args = step.input(state);
            let outcome = ctx
                .task(step.task(), &args)
                .await
                .ok_or(RunError::Cancelled)?;

            match outcome {
                Ok(StepResult::Success(output)) => {
                    self.emit(RunEvent::StepCompleted {
                        step: name.clone(),
                        artifacts: output.artifacts.len(),
                    });
                    state.fold(&name, output);
                }
                Ok(StepResult::Failed { error, details }) => {
                    self.emit(RunEvent::StepFailed {
                        step: name.clone(),
                        error: error.clone(),
                    });
                    return Err(RunError::StepFailure {
                        step: name,
                        error,
                        details,
                    });
                }
                Err(InvokeError::SchemaViolation(schema_error)) => {
                    let message = schema_error.to_string();
                    self.emit(RunEvent::StepFailed {
                        step: name.clone(),
                        error: message.clone(),
                    });
                    return Err(RunError::SchemaViolation {
                        step: name,
                        message,
                    });
                }
                Err(InvokeError::InvocationFailure(message)) => {
                    self.emit(RunEvent::StepFailed {
                        step: name.clone(),
                        error: message.clone(),
                    });
                    return Err(RunError::InvocationFailure {
                        step: name,
                        message,
                    });
                }
            }

            if let Some(gate) = pipeline.gate() {
                if gate.after() == index + 1 {
                    self.await_approval(gate, state, ctx).await?;
                }
            }
        }

        Ok(())
    }

    async fn await_approval(
        &self,
        gate: &crate::core::Gate,
        state: &mut PipelineState,
        ctx: &ExecutionContext,
    ) -> Result<(), RunError> {
        state.status = RunStatus::AwaitingApproval;

        let prompt = gate.prompt(state);
        let request = BreakpointRequest {
            title: prompt.title.clone(),
            question: prompt.question.clone(),
            context: BreakpointContext {
                run_id: state.run_id(),
                files: state.ledger().view(),
                summary: prompt.summary,
            },
        };

        info!("Awaiting approval: {}", prompt.title);
        self.emit(RunEvent::BreakpointRaised {
            title: prompt.title,
            question: prompt.question,
        });

        let decision = ctx
            .breakpoint(request)
            .await
            .ok_or(RunError::Cancelled)?
            .map_err(|e| RunError::InvocationFailure {
                step: "breakpoint".to_string(),
                message: e.to_string(),
            })?;

        self.emit(RunEvent::BreakpointResolved {
            decision: decision.clone(),
        });

        match decision {
            ResumeDecision::Approve => Ok(()),
            ResumeDecision::Reject { reason } => {
                warn!("Breakpoint rejected: {}", reason);
                Err(RunError::BreakpointRejection { reason })
            }
            ResumeDecision::Modify { patch } => {
                info!("Breakpoint modified run configuration");
                state.apply_patch(&patch);
                Ok(())
            }
        }
    }
}
