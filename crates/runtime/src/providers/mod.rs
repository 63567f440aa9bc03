//! LLM provider adapters.
//!
//! Each provider implements [`Backend`](crate::model::Backend) for its
//! specific API, which makes it a completion engine.

mod anthropic;
mod openai;

pub use anthropic::{AnthropicBackend, AnthropicBackendBuilder};
pub use openai::{OpenAiBackend, OpenAiBackendBuilder, strip_thinking};
