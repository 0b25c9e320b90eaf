//! Task definitions - one named unit of delegated work, and its invocation spec

use crate::core::schema::SchemaContract;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The capability an invocation is dispatched to
///
/// Tagged so the invoker, not the sequencer, decides how to execute it.
/// `Agent` is the only kind the observed workflows use; new kinds slot in
/// here without touching the sequencer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvocationKind {
    Agent {
        /// Persona the agent should adopt, e.g. "museum finance director"
        role: String,

        /// Full prompt, already interpolated with the step's arguments
        prompt: String,

        /// Contract the result must satisfy
        output_schema: SchemaContract,
    },
}

impl InvocationKind {
    /// The schema contract the result of this invocation must satisfy
    pub fn contract(&self) -> &SchemaContract {
        match self {
            InvocationKind::Agent { output_schema, .. } => output_schema,
        }
    }
}

/// Everything an external invoker needs to perform one unit of work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationSpec {
    /// Run-unique invocation id, `<run_id>/<step name>`
    pub invocation_id: String,

    /// Human-readable label for logs and review surfaces
    pub label: String,

    #[serde(flatten)]
    pub kind: InvocationKind,

    /// Conventional location for the arguments passed into `build`
    pub input_path: String,

    /// Conventional location for the raw result before ledger folding
    pub result_path: String,
}

/// Binds a step name to an invocation recipe and a result contract
///
/// `build` is pure: same args and invocation id, same spec, no I/O.
/// Owned by the workflow author; the sequencer only borrows it.
pub struct TaskDefinition {
    name: String,
    builder: Box<dyn Fn(&Value, &str) -> InvocationSpec + Send + Sync>,
}

impl TaskDefinition {
    pub fn new<B>(name: &str, builder: B) -> Self
    where
        B: Fn(&Value, &str) -> InvocationSpec + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            builder: Box::new(builder),
        }
    }

    /// Convenience constructor for the agent capability
    ///
    /// `prompt` maps the step's arguments to the full prompt text.
    pub fn agent<P>(name: &str, role: &str, output_schema: SchemaContract, prompt: P) -> Self
    where
        P: Fn(&Value) -> String + Send + Sync + 'static,
    {
        let step_name = name.to_string();
        let role = role.to_string();
        Self::new(name, move |args, invocation_id| InvocationSpec {
            invocation_id: invocation_id.to_string(),
            label: step_name.clone(),
            kind: InvocationKind::Agent {
                role: role.clone(),
                prompt: prompt(args),
                output_schema: output_schema.clone(),
            },
            input_path: format!("tasks/{}/input.json", invocation_id),
            result_path: format!("tasks/{}/result.json", invocation_id),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Produce the invocation spec for one invocation
    pub fn build(&self, args: &Value, invocation_id: &str) -> InvocationSpec {
        (self.builder)(args, invocation_id)
    }
}

impl fmt::Debug for TaskDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{FieldKind, SchemaContract};
    use serde_json::json;

    fn revenue_task() -> TaskDefinition {
        TaskDefinition::agent(
            "revenue",
            "museum finance director",
            SchemaContract::new().field("totalRevenue", FieldKind::Number),
            |args| {
                format!(
                    "Project total revenue for fiscal year {}.",
                    args["fiscalYear"].as_str().unwrap_or("?")
                )
            },
        )
    }

    #[test]
    fn test_build_interpolates_args() {
        let task = revenue_task();
        let spec = task.build(&json!({ "fiscalYear": "2025" }), "run-1/revenue");

        assert_eq!(spec.invocation_id, "run-1/revenue");
        assert_eq!(spec.label, "revenue");
        match &spec.kind {
            InvocationKind::Agent { role, prompt, .. } => {
                assert_eq!(role, "museum finance director");
                assert!(prompt.contains("fiscal year 2025"));
            }
        }
    }

    #[test]
    fn test_build_derives_path_hints() {
        let task = revenue_task();
        let spec = task.build(&json!({}), "run-1/revenue");
        assert_eq!(spec.input_path, "tasks/run-1/revenue/input.json");
        assert_eq!(spec.result_path, "tasks/run-1/revenue/result.json");
    }

    #[test]
    fn test_spec_serialises_with_kind_tag() {
        let task = revenue_task();
        let spec = task.build(&json!({ "fiscalYear": "2025" }), "run-1/revenue");
        let value = serde_json::to_value(&spec).unwrap();

        assert_eq!(value["kind"], json!("agent"));
        assert_eq!(value["role"], json!("museum finance director"));
        assert!(value["output_schema"]["fields"].is_array());
    }

    #[test]
    fn test_build_is_pure() {
        let task = revenue_task();
        let args = json!({ "fiscalYear": "2025" });
        let a = serde_json::to_value(task.build(&args, "run-1/revenue")).unwrap();
        let b = serde_json::to_value(task.build(&args, "run-1/revenue")).unwrap();
        assert_eq!(a, b);
    }
}
