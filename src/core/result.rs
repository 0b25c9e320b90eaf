//! Step results - what comes back from one invocation

use crate::core::artifact::Artifact;
use crate::core::schema::{SchemaContract, SchemaError};
use serde_json::{Map, Value};

/// The successful side of a step result
#[derive(Debug, Clone, Default)]
pub struct StepOutput {
    /// Structured fields defined by the step's schema contract
    pub payload: Map<String, Value>,

    /// Artifacts the step produced, in production order
    pub artifacts: Vec<Artifact>,
}

/// Result of one invocation, inspected uniformly for every step
///
/// The raw result may carry an explicit `success` flag; absence means
/// success. Whichever step it came from, a `Failed` variant aborts the run.
#[derive(Debug, Clone)]
pub enum StepResult {
    Success(StepOutput),
    Failed {
        error: String,
        details: Option<Value>,
    },
}

impl StepResult {
    /// Parse a raw result object, honouring an explicit `success: false`
    ///
    /// Failed results skip contract validation (their fields describe the
    /// failure, not the contracted payload). Successful results are
    /// validated and split into payload and artifacts; the `success` and
    /// `artifacts` keys are not part of the payload.
    pub fn parse(raw: Value, contract: &SchemaContract) -> Result<StepResult, SchemaError> {
        if raw.get("success").and_then(Value::as_bool) == Some(false) {
            let error = raw
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("step reported failure")
                .to_string();
            let details = raw.get("details").cloned();
            return Ok(StepResult::Failed { error, details });
        }

        contract.validate(&raw)?;

        let mut object = match raw {
            Value::Object(map) => map,
            _ => return Err(SchemaError::NotAnObject),
        };

        let artifacts = object
            .remove("artifacts")
            .and_then(|v| {
                v.as_array()
                    .map(|entries| entries.iter().filter_map(Artifact::from_value).collect())
            })
            .unwrap_or_default();
        object.remove("success");

        Ok(StepResult::Success(StepOutput {
            payload: object,
            artifacts,
        }))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepResult::Success(_))
    }
}
