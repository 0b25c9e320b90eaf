//! Pipeline run state - accumulated step outputs within one run

use crate::core::artifact::ArtifactLedger;
use crate::core::result::StepOutput;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Where a run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Run has not started
    Idle,
    /// Executing step at this zero-based index
    Running(usize),
    /// Suspended at the breakpoint gate
    AwaitingApproval,
    /// All steps succeeded
    Completed,
    /// Run aborted on failure, rejection, or cancellation
    Aborted,
}

/// Accumulated, ordered record of prior step outputs within one run
///
/// Exclusively owned by one run; nothing here is shared across concurrent
/// runs. Step payloads are kept in execution order and never mutated after
/// folding.
#[derive(Debug)]
pub struct PipelineState {
    run_id: Uuid,
    config: Value,
    outputs: Vec<(String, Map<String, Value>)>,
    ledger: ArtifactLedger,
    pub status: RunStatus,
}

impl PipelineState {
    pub fn new(run_id: Uuid, config: Value) -> Self {
        Self {
            run_id,
            config,
            outputs: Vec::new(),
            ledger: ArtifactLedger::new(),
            status: RunStatus::Idle,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The effective run configuration (defaults applied, gate edits merged)
    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn ledger(&self) -> &ArtifactLedger {
        &self.ledger
    }

    /// Fold one completed step's output into the state
    pub fn fold(&mut self, step_name: &str, output: StepOutput) {
        self.outputs.push((step_name.to_string(), output.payload));
        self.ledger.extend(output.artifacts);
    }

    /// Payload of a prior step, by name
    pub fn output(&self, step_name: &str) -> Option<&Map<String, Value>> {
        self.outputs
            .iter()
            .find(|(name, _)| name == step_name)
            .map(|(_, payload)| payload)
    }

    /// One field from a prior step's payload
    pub fn field(&self, step_name: &str, field: &str) -> Option<&Value> {
        self.output(step_name).and_then(|payload| payload.get(field))
    }

    /// Numeric field from a prior step's payload
    pub fn number(&self, step_name: &str, field: &str) -> Option<f64> {
        self.field(step_name, field).and_then(Value::as_f64)
    }

    /// Step names folded so far, in execution order
    pub fn completed_steps(&self) -> Vec<&str> {
        self.outputs.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Apply a gate edit to the run configuration (RFC 7386 merge-patch)
    ///
    /// Already-folded step outputs are untouched; only the configuration
    /// later steps read through their input closures changes.
    pub fn apply_patch(&mut self, patch: &Value) {
        merge_patch(&mut self.config, patch);
    }
}

/// RFC 7386 merge-patch: objects merge recursively, `null` removes, and
/// anything else replaces.
fn merge_patch(target: &mut Value, patch: &Value) {
    match patch {
        Value::Object(patch_map) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(target_map) = target {
                for (key, patch_value) in patch_map {
                    if patch_value.is_null() {
                        target_map.remove(key);
                    } else {
                        merge_patch(
                            target_map.entry(key.clone()).or_insert(Value::Null),
                            patch_value,
                        );
                    }
                }
            }
        }
        other => *target = other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::Artifact;
    use serde_json::json;

    fn output(payload: Value, artifacts: Vec<Artifact>) -> StepOutput {
        StepOutput {
            payload: payload.as_object().unwrap().clone(),
            artifacts,
        }
    }

    #[test]
    fn test_fold_accumulates_in_order() {
        let mut state = PipelineState::new(Uuid::new_v4(), json!({}));
        state.fold(
            "revenue",
            output(json!({ "totalRevenue": 520000 }), vec![Artifact::new("rev.md")]),
        );
        state.fold(
            "expenses",
            output(json!({ "totalExpenses": 480000 }), vec![Artifact::new("exp.md")]),
        );

        assert_eq!(state.completed_steps(), vec!["revenue", "expenses"]);
        assert_eq!(state.number("revenue", "totalRevenue"), Some(520000.0));
        assert_eq!(state.number("expenses", "totalExpenses"), Some(480000.0));
        assert_eq!(state.ledger().len(), 2);
    }

    #[test]
    fn test_missing_step_and_field() {
        let state = PipelineState::new(Uuid::new_v4(), json!({}));
        assert!(state.output("revenue").is_none());
        assert!(state.number("revenue", "totalRevenue").is_none());
    }

    #[test]
    fn test_apply_patch_merges_config() {
        let mut state = PipelineState::new(
            Uuid::new_v4(),
            json!({ "fiscalYear": "2025", "annualBudget": 500000, "notes": { "a": 1 } }),
        );

        state.apply_patch(&json!({ "annualBudget": 475000, "notes": { "b": 2 } }));

        assert_eq!(state.config()["annualBudget"], json!(475000));
        assert_eq!(state.config()["fiscalYear"], json!("2025"));
        assert_eq!(state.config()["notes"], json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn test_apply_patch_null_removes() {
        let mut state =
            PipelineState::new(Uuid::new_v4(), json!({ "keep": 1, "drop": 2 }));
        state.apply_patch(&json!({ "drop": null }));

        assert_eq!(state.config(), &json!({ "keep": 1 }));
    }
}
