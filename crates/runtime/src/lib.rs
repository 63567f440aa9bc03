//! ReAct agent runtime: completion engines, tools, and the agent loop.
//!
//! # Overview
//!
//! The runtime is organized around these concepts:
//!
//! - **CompletionEngine**: turns a prompt, a history and a system instruction
//!   into generated text plus the extended history. Every [`Backend`]
//!   (Anthropic, OpenAI-compatible) is one.
//! - **ToolRegistry**: an immutable set of named tools with declared
//!   parameters, executed by name with relaxed-JSON arguments.
//! - **Agent**: the ReAct loop. It asks the model, parses at most one
//!   `Action` / `Action Input` pair, runs the tool, splices the observation
//!   back in and asks the model again.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{Agent, AnthropicBackend, tools::builtin};
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = AnthropicBackend::builder("sk-ant-api01-...", "claude-sonnet-4-20250514")
//!     .build()?;
//! let tools = builtin::registry(&builtin::BuiltinConfig::default())?;
//!
//! let agent = Agent::new(backend, tools);
//! let result = agent.run_turn("What time is it?", &[]).await?;
//! println!("{}", runtime::final_answer(&result.final_text));
//! # Ok(())
//! # }
//! ```

mod error;
pub mod model;
pub mod prompt;
pub mod providers;
pub mod react;
pub mod tools;

pub use error::{Error, Result};
pub use model::{
    Backend, Completion, CompletionEngine, CompletionRequest, ModelError, ModelRequest,
    ModelResponse, Role, Turn, Usage, prepare_history,
};
pub use prompt::build_system_instruction;
pub use providers::{AnthropicBackend, OpenAiBackend};
pub use react::{Agent, LoopResult, ToolCall, final_answer, parse_last_call};
pub use tools::{ParamType, ParameterSpec, Tool, ToolError, ToolRegistry, ToolSpec};
