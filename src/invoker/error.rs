//! Invoker boundary errors

use crate::core::SchemaError;
use thiserror::Error;

/// Error types for the invoker boundary
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The result did not conform to the declared schema contract
    #[error("schema violation: {0}")]
    SchemaViolation(#[from] SchemaError),

    /// The call could not be completed (capability unreachable,
    /// malformed spec, timeout, transport error)
    #[error("invocation failure: {0}")]
    InvocationFailure(String),
}
