//! Tool trait.

use super::{ToolError, ToolSpec};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Validated keyword arguments for a tool call.
pub type ToolArgs = Map<String, Value>;

/// A callable tool.
///
/// Implementations provide their specification and execute calls whose
/// arguments have already been validated against it. This is the boundary
/// between the agent loop and side effects.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's specification.
    fn spec(&self) -> &ToolSpec;

    /// Execute the tool, returning observation text.
    async fn call(&self, args: ToolArgs) -> Result<String, ToolError>;
}

type Handler = dyn Fn(ToolArgs) -> Result<String, ToolError> + Send + Sync;

/// A tool backed by a synchronous closure.
pub struct FnTool {
    spec: ToolSpec,
    handler: Box<Handler>,
}

impl FnTool {
    pub fn new<F>(spec: ToolSpec, handler: F) -> Self
    where
        F: Fn(ToolArgs) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self {
            spec,
            handler: Box::new(handler),
        }
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool").field("spec", &self.spec).finish()
    }
}

#[async_trait]
impl Tool for FnTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, args: ToolArgs) -> Result<String, ToolError> {
        (self.handler)(args)
    }
}
