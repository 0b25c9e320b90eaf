//! Pipeline domain model

use crate::core::breakpoint::GatePrompt;
use crate::core::state::PipelineState;
use crate::core::task::TaskDefinition;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Errors raised while assembling a pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline '{0}' has no steps")]
    NoSteps(String),

    #[error("duplicate step name '{0}'")]
    DuplicateStep(String),

    #[error("gate position {after} is outside the step sequence (1..{max})")]
    GateOutOfRange { after: usize, max: usize },

    #[error("pipeline already has a gate")]
    DuplicateGate,
}

/// One step slot: the task plus the closure deriving its arguments
///
/// The input closure is a pure function of PipelineState and the run
/// configuration; it never mutates a prior step's result.
pub struct PipelineStep {
    task: TaskDefinition,
    input: Box<dyn Fn(&PipelineState) -> Value + Send + Sync>,
}

impl PipelineStep {
    pub fn task(&self) -> &TaskDefinition {
        &self.task
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Derive this step's arguments from the current state
    pub fn input(&self, state: &PipelineState) -> Value {
        (self.input)(state)
    }
}

/// The single human-review gate of a pipeline
pub struct Gate {
    after: usize,
    build: Box<dyn Fn(&PipelineState) -> GatePrompt + Send + Sync>,
}

impl Gate {
    /// Number of steps that run before the gate (1-based prefix length)
    pub fn after(&self) -> usize {
        self.after
    }

    /// Build the title/question/summary from the state at the gate
    pub fn prompt(&self, state: &PipelineState) -> GatePrompt {
        (self.build)(state)
    }
}

/// A fixed, linear sequence of task definitions with one review gate
///
/// Step order is declared at authoring time and never computed from data.
pub struct Pipeline {
    name: String,
    steps: Vec<PipelineStep>,
    gate: Option<Gate>,
    finish: Box<dyn Fn(&PipelineState) -> Value + Send + Sync>,
}

impl Pipeline {
    pub fn builder(name: &str) -> PipelineBuilder {
        PipelineBuilder {
            name: name.to_string(),
            steps: Vec::new(),
            gate: None,
            duplicate_gate: false,
            finish: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn gate(&self) -> Option<&Gate> {
        self.gate.as_ref()
    }

    /// Assemble the domain payload for the terminal result
    pub fn finish(&self, state: &PipelineState) -> Value {
        (self.finish)(state)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("gate_after", &self.gate.as_ref().map(|g| g.after()))
            .finish_non_exhaustive()
    }
}

/// Builder for [`Pipeline`]
pub struct PipelineBuilder {
    name: String,
    steps: Vec<PipelineStep>,
    gate: Option<Gate>,
    duplicate_gate: bool,
    finish: Option<Box<dyn Fn(&PipelineState) -> Value + Send + Sync>>,
}

impl PipelineBuilder {
    /// Append a step; order of calls is execution order
    pub fn step<I>(mut self, task: TaskDefinition, input: I) -> Self
    where
        I: Fn(&PipelineState) -> Value + Send + Sync + 'static,
    {
        self.steps.push(PipelineStep {
            task,
            input: Box::new(input),
        });
        self
    }

    /// Place the gate after the first `after` steps
    pub fn gate_after<G>(mut self, after: usize, build: G) -> Self
    where
        G: Fn(&PipelineState) -> GatePrompt + Send + Sync + 'static,
    {
        if self.gate.is_some() {
            self.duplicate_gate = true;
            return self;
        }
        self.gate = Some(Gate {
            after,
            build: Box::new(build),
        });
        self
    }

    /// Closure producing the domain payload from final state
    pub fn finish<F>(mut self, finish: F) -> Self
    where
        F: Fn(&PipelineState) -> Value + Send + Sync + 'static,
    {
        self.finish = Some(Box::new(finish));
        self
    }

    pub fn build(self) -> Result<Pipeline, PipelineError> {
        if self.duplicate_gate {
            return Err(PipelineError::DuplicateGate);
        }
        if self.steps.is_empty() {
            return Err(PipelineError::NoSteps(self.name));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.name().to_string()) {
                return Err(PipelineError::DuplicateStep(step.name().to_string()));
            }
        }

        if let Some(gate) = &self.gate {
            // The gate sits after a strict prefix and before a strict suffix
            if gate.after == 0 || gate.after >= self.steps.len() {
                return Err(PipelineError::GateOutOfRange {
                    after: gate.after,
                    max: self.steps.len() - 1,
                });
            }
        }

        Ok(Pipeline {
            name: self.name,
            steps: self.steps,
            gate: self.gate,
            finish: self.finish.unwrap_or_else(|| Box::new(|_| Value::Null)),
        })
    }
}
