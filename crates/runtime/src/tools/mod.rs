//! Tool registry, argument handling and built-in tools.

mod args;
pub mod builtin;
pub mod errors;
mod registry;
mod tool;
pub mod types;

pub use args::{parse_arguments, validate_arguments};
pub use errors::ToolError;
pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use tool::{FnTool, Tool, ToolArgs};
pub use types::{ParamType, ParameterSpec, ToolSpec};
