//! Subprocess invoker - delegates invocations to an external agent program

use crate::core::{InvocationSpec, StepResult};
use crate::invoker::{InvokeError, TaskInvoker};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Configuration for the subprocess invoker
#[derive(Debug, Clone)]
pub struct InvokerConfig {
    /// Path to the agent program; defaults to "atelier-agent" on PATH
    pub program: Option<String>,

    /// Per-invocation timeout in seconds; `None` blocks until the
    /// program exits
    pub timeout_secs: Option<u64>,
}

impl InvokerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: String) -> Self {
        self.program = Some(program);
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            program: None,
            timeout_secs: None,
        }
    }
}

/// Invoker that hands each spec to an agent program as a subprocess
///
/// The serialised `InvocationSpec` goes to the program as its single
/// argument; stdout is parsed as the raw result JSON and validated
/// against the invocation's contract. Retry policy belongs to the
/// program, not to this invoker.
#[derive(Debug, Clone)]
pub struct SubprocessInvoker {
    program: String,
    timeout_secs: Option<u64>,
}

impl SubprocessInvoker {
    pub fn new(config: InvokerConfig) -> Self {
        Self {
            program: config.program.unwrap_or_else(|| "atelier-agent".to_string()),
            timeout_secs: config.timeout_secs,
        }
    }

    #[cfg(test)]
    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run_program(&self, spec_json: String) -> Result<Vec<u8>, InvokeError> {
        let mut command = tokio::process::Command::new(&self.program);
        command.arg("--invoke").arg(spec_json).kill_on_drop(true);

        let output = match self.timeout_secs {
            Some(secs) => timeout(Duration::from_secs(secs), command.output())
                .await
                .map_err(|_| {
                    InvokeError::InvocationFailure(format!("timed out after {} seconds", secs))
                })?,
            None => command.output().await,
        }
        .map_err(|e| {
            InvokeError::InvocationFailure(format!(
                "failed to spawn '{}': {}",
                self.program, e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}: {}", self.program, exit_code, stderr.trim());
            return Err(InvokeError::InvocationFailure(format!(
                "'{}' exited with code {}: {}",
                self.program,
                exit_code,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl TaskInvoker for SubprocessInvoker {
    async fn invoke(&self, spec: &InvocationSpec) -> Result<StepResult, InvokeError> {
        let spec_json = serde_json::to_string(spec)
            .map_err(|e| InvokeError::InvocationFailure(format!("malformed spec: {}", e)))?;

        debug!(
            "Invoking {} for '{}' ({} bytes of spec)",
            self.program,
            spec.invocation_id,
            spec_json.len()
        );

        let stdout = self.run_program(spec_json).await?;

        let raw: serde_json::Value = serde_json::from_slice(&stdout).map_err(|e| {
            InvokeError::InvocationFailure(format!(
                "'{}' produced invalid result JSON: {}",
                self.program, e
            ))
        })?;

        debug!("Invocation '{}' returned {} bytes", spec.invocation_id, stdout.len());

        Ok(StepResult::parse(raw, spec.kind.contract())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_program() {
        let invoker = SubprocessInvoker::new(InvokerConfig::default());
        assert_eq!(invoker.program(), "atelier-agent");
    }

    #[test]
    fn test_custom_program() {
        let invoker = SubprocessInvoker::new(
            InvokerConfig::new().with_program("/usr/local/bin/curator-agent".to_string()),
        );
        assert_eq!(invoker.program(), "/usr/local/bin/curator-agent");
    }

    #[tokio::test]
    async fn test_spawn_failure_is_invocation_failure() {
        use crate::core::{FieldKind, SchemaContract, TaskDefinition};

        let invoker = SubprocessInvoker::new(
            InvokerConfig::new().with_program("nonexistent-agent-binary".to_string()),
        );
        let task = TaskDefinition::agent(
            "revenue",
            "museum finance director",
            SchemaContract::new().field("totalRevenue", FieldKind::Number),
            |_| "project revenue".to_string(),
        );
        let spec = task.build(&serde_json::json!({}), "run-1/revenue");

        let result = invoker.invoke(&spec).await;
        assert!(matches!(result, Err(InvokeError::InvocationFailure(_))));
    }
}
