//! Artifacts and the append-only artifact ledger

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default format assumed when a step result omits one
pub const DEFAULT_ARTIFACT_FORMAT: &str = "markdown";

/// A produced file reference surfaced for human review and in the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Path of the produced file, relative to the run's output directory
    pub path: String,

    /// File format; `None` means the contributing step didn't say
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Artifact {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            format: None,
        }
    }

    pub fn with_format(path: &str, format: &str) -> Self {
        Self {
            path: path.to_string(),
            format: Some(format.to_string()),
        }
    }

    /// Parse one artifact entry from a raw step result
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let path = object.get("path")?.as_str()?.to_string();
        let format = object
            .get("format")
            .and_then(|f| f.as_str())
            .map(|f| f.to_string());
        Some(Self { path, format })
    }
}

/// Read-only artifact entry with the format default applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactView {
    pub path: String,
    pub format: String,
}

/// Append-only collection of artifacts contributed by completed steps
///
/// Contribution order is preserved across steps; duplicates are kept as
/// distinct entries. Callers rely on order, not uniqueness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactLedger {
    entries: Vec<Artifact>,
}

impl ArtifactLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one step's artifacts, in the order the step produced them
    pub fn extend(&mut self, artifacts: Vec<Artifact>) {
        self.entries.extend(artifacts);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Artifact] {
        &self.entries
    }

    /// Read-only view with `format` defaulted to `"markdown"` when absent
    pub fn view(&self) -> Vec<ArtifactView> {
        self.entries
            .iter()
            .map(|a| ArtifactView {
                path: a.path.clone(),
                format: a
                    .format
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ARTIFACT_FORMAT.to_string()),
            })
            .collect()
    }
}
