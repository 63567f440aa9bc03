//! Immutable tool registry and dispatcher.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{Tool, ToolArgs, ToolError, ToolSpec, parse_arguments, validate_arguments};
use crate::react::OBSERVATION_MARKER;

/// Collects tools and validates them into a [`ToolRegistry`].
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool.
    pub fn register(self, tool: impl Tool + 'static) -> Self {
        self.register_arc(Arc::new(tool))
    }

    /// Add a shared tool.
    pub fn register_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Validate registrations and build the registry.
    ///
    /// Fails on an empty or duplicate tool name, or a duplicate parameter
    /// name within one tool.
    pub fn build(self) -> Result<ToolRegistry, ToolError> {
        let mut specs = Vec::with_capacity(self.tools.len());
        let mut tools = HashMap::with_capacity(self.tools.len());

        for tool in self.tools {
            let spec = tool.spec().clone();
            let name = spec.internal_name.trim();
            if name.is_empty() || name != spec.internal_name {
                return Err(ToolError::Registration(format!(
                    "invalid tool name {:?}",
                    spec.internal_name
                )));
            }

            let mut seen = HashSet::new();
            if let Some(dup) = spec.parameters.iter().find(|p| !seen.insert(&p.name)) {
                return Err(ToolError::Registration(format!(
                    "duplicate parameter '{}' in tool '{name}'",
                    dup.name
                )));
            }

            if tools.insert(spec.internal_name.clone(), tool).is_some() {
                return Err(ToolError::Registration(format!(
                    "duplicate tool name '{name}'"
                )));
            }
            specs.push(spec);
        }

        Ok(ToolRegistry { specs, tools })
    }
}

/// Registered tools, keyed by internal name.
///
/// Built once and never mutated; the same value feeds the prompt builder and
/// the dispatcher.
pub struct ToolRegistry {
    specs: Vec<ToolSpec>,
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    /// A registry with no tools.
    pub fn empty() -> Self {
        Self {
            specs: Vec::new(),
            tools: HashMap::new(),
        }
    }

    /// Specifications in registration order.
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Look up a specification by internal name.
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name).map(|tool| tool.spec())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Validate `args` against the tool's parameters and execute it.
    pub async fn execute(&self, name: &str, args: ToolArgs) -> Result<String, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let args = validate_arguments(&tool.spec().parameters, args)?;
        info!(tool = name, "executing tool");
        tool.call(args).await
    }

    /// Parse raw model arguments and execute the named tool.
    ///
    /// Returns the observation text, prefixed with the observation marker.
    pub async fn invoke(&self, name: &str, raw_args: &str) -> Result<String, ToolError> {
        if !self.tools.contains_key(name) {
            return Err(ToolError::NotFound(name.to_string()));
        }

        let args = parse_arguments(raw_args)?;
        debug!(tool = name, ?args, "parsed tool arguments");

        let output = self.execute(name, args).await?;
        Ok(format!("{OBSERVATION_MARKER} {output}"))
    }

    /// Like [`invoke`](Self::invoke), but failures become error observations
    /// so the model can react to them.
    pub async fn observe(&self, name: &str, raw_args: &str) -> String {
        match self.invoke(name, raw_args).await {
            Ok(observation) => observation,
            Err(e) => {
                warn!(tool = name, error = %e, "tool call failed");
                format!("{OBSERVATION_MARKER} Error: {e}")
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("specs", &self.specs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FnTool, ParamType, ParameterSpec};

    fn echo_tool(name: &str) -> FnTool {
        let spec = ToolSpec::new(name, "Echo", "Echo the input.")
            .param(ParameterSpec::required("text", ParamType::String, "Text"));
        FnTool::new(spec, |args| {
            Ok(args["text"].as_str().unwrap_or_default().to_string())
        })
    }

    fn failing_tool() -> FnTool {
        FnTool::new(ToolSpec::new("broken", "Broken", "Always fails."), |_| {
            Err(ToolError::Execution("upstream unavailable".into()))
        })
    }

    #[test]
    fn empty_registry_has_no_tools() {
        let registry = ToolRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.specs().is_empty());
    }

    #[test]
    fn specs_keep_registration_order() {
        let registry = ToolRegistry::builder()
            .register(echo_tool("b"))
            .register(echo_tool("a"))
            .build()
            .unwrap();
        let names: Vec<_> = registry
            .specs()
            .iter()
            .map(|s| s.internal_name.as_str())
            .collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("a").is_some());
        assert!(registry.get("c").is_none());
    }

    #[test]
    fn duplicate_tool_names_are_rejected() {
        let err = ToolRegistry::builder()
            .register(echo_tool("echo"))
            .register(echo_tool("echo"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::Registration("duplicate tool name 'echo'".into())
        );
    }

    #[test]
    fn blank_and_padded_names_are_rejected() {
        assert!(ToolRegistry::builder().register(echo_tool("")).build().is_err());
        assert!(ToolRegistry::builder().register(echo_tool(" echo")).build().is_err());
    }

    #[test]
    fn duplicate_parameter_names_are_rejected() {
        let spec = ToolSpec::new("t", "T", "T.")
            .param(ParameterSpec::required("x", ParamType::String, "x"))
            .param(ParameterSpec::optional("x", ParamType::Number, "x again"));
        let err = ToolRegistry::builder()
            .register(FnTool::new(spec, |_| Ok(String::new())))
            .build()
            .unwrap_err();
        assert!(matches!(err, ToolError::Registration(_)));
    }

    #[tokio::test]
    async fn invoke_prefixes_observation() {
        let registry = ToolRegistry::builder()
            .register(echo_tool("echo"))
            .build()
            .unwrap();
        let observation = registry.invoke("echo", "{text: 'hi',}").await.unwrap();
        assert_eq!(observation, "\nObservation: hi");
    }

    #[tokio::test]
    async fn invoke_unknown_tool_fails() {
        let registry = ToolRegistry::empty();
        let err = registry.invoke("nope", "{}").await.unwrap_err();
        assert_eq!(err, ToolError::NotFound("nope".into()));
    }

    #[tokio::test]
    async fn invoke_bad_arguments_fails() {
        let registry = ToolRegistry::builder()
            .register(echo_tool("echo"))
            .build()
            .unwrap();
        let err = registry.invoke("echo", "{text: ").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = registry.invoke("echo", "{}").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn observe_turns_errors_into_observations() {
        let registry = ToolRegistry::builder()
            .register(failing_tool())
            .build()
            .unwrap();

        assert_eq!(
            registry.observe("broken", "").await,
            "\nObservation: Error: execution failed: upstream unavailable"
        );
        assert_eq!(
            registry.observe("missing", "{}").await,
            "\nObservation: Error: tool not found: missing"
        );
    }
}
