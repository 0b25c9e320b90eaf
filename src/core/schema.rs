//! Schema contracts - structural description of a step's expected result

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error raised when a step result does not match its contract
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}' expected {expected}, got {actual}")]
    WrongKind {
        field: String,
        expected: FieldKind,
        actual: String,
    },

    #[error("result is not a JSON object")]
    NotAnObject,
}

/// The JSON kind a contract field must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Array => value.is_array(),
            FieldKind::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        };
        write!(f, "{}", name)
    }
}

/// One field a step result must (or may) carry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in the result JSON
    pub name: String,

    /// Expected JSON kind
    pub kind: FieldKind,

    /// Whether the field must be present
    pub required: bool,
}

/// Structural description of a step's expected result shape
///
/// Pure data: the contract is serialised into the `InvocationSpec` so the
/// external agent knows what to produce, and checked again at the invoker
/// boundary before the result reaches the sequencer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaContract {
    pub fields: Vec<FieldSpec>,
}

impl SchemaContract {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a required field
    pub fn field(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            kind,
            required: true,
        });
        self
    }

    /// Add an optional field
    pub fn optional(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            kind,
            required: false,
        });
        self
    }

    /// Validate a raw result object against this contract
    ///
    /// Only structure is checked: presence of required fields and JSON
    /// kinds. Payload semantics are the workflow author's business.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaError> {
        let object = value.as_object().ok_or(SchemaError::NotAnObject)?;

        for spec in &self.fields {
            match object.get(&spec.name) {
                Some(field_value) => {
                    if !spec.kind.matches(field_value) {
                        return Err(SchemaError::WrongKind {
                            field: spec.name.clone(),
                            expected: spec.kind,
                            actual: json_kind_name(field_value).to_string(),
                        });
                    }
                }
                None if spec.required => {
                    return Err(SchemaError::MissingField {
                        field: spec.name.clone(),
                    });
                }
                None => {}
            }
        }

        Ok(())
    }
}

fn json_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
