use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while resolving or executing a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ToolError {
    /// No registered tool has this name.
    #[error("tool not found: {0}")]
    NotFound(String),
    /// Arguments are not a relaxed-JSON object, or fail the parameter schema.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// The tool itself failed.
    #[error("execution failed: {0}")]
    Execution(String),
    /// A tool was rejected when the registry was built.
    #[error("invalid tool registration: {0}")]
    Registration(String),
}
