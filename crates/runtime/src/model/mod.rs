//! Conversation types and the completion engine contract.

pub mod errors;
pub mod types;

pub use errors::ModelError;
pub use types::{
    Backend, Completion, CompletionEngine, CompletionRequest, ModelRequest, ModelResponse, Role,
    Turn, Usage, prepare_history,
};
