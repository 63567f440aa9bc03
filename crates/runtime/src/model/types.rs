//! Conversation turns, backend requests and the completion engine contract.

use super::errors::ModelError;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// The role of a conversation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single turn in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// Create a turn with a role and text content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Everything a backend needs for one call.
///
/// `messages` always starts with the system turn.
#[derive(Debug, Clone)]
pub struct ModelRequest<'a> {
    pub messages: &'a [Turn],
}

impl ModelRequest<'_> {
    /// The system instruction, if the conversation carries one.
    pub fn system(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|t| t.role == Role::System)
            .map(|t| t.content.as_str())
    }

    /// All non-system turns, in order.
    pub fn dialogue(&self) -> impl Iterator<Item = &Turn> {
        self.messages.iter().filter(|t| t.role != Role::System)
    }
}

/// The raw response from a backend.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub text: String,
    pub usage: Usage,
}

/// Trait for LLM provider backends.
pub trait Backend: Send + Sync {
    fn call(
        &self,
        request: ModelRequest<'_>,
    ) -> impl Future<Output = Result<ModelResponse, ModelError>> + Send;
}

/// Input to one completion pass.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    pub history: &'a [Turn],
    pub system: &'a str,
}

/// Output of one completion pass.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generated text.
    pub text: String,
    /// The input history plus exactly one user and one assistant turn.
    pub history: Vec<Turn>,
    pub usage: Usage,
}

/// Turns a prompt, a history and a system instruction into generated text
/// plus the extended history.
///
/// Every [`Backend`] is a completion engine.
pub trait CompletionEngine: Send + Sync {
    fn complete(
        &self,
        request: CompletionRequest<'_>,
    ) -> impl Future<Output = Result<Completion, ModelError>> + Send;
}

impl<B: Backend> CompletionEngine for B {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ModelError> {
        let mut conversation = prepare_history(request.history, request.system);
        conversation.push(Turn::user(request.prompt));

        let response = self
            .call(ModelRequest {
                messages: &conversation,
            })
            .await?;

        conversation.push(Turn::assistant(response.text.clone()));

        Ok(Completion {
            text: response.text,
            history: conversation,
            usage: response.usage,
        })
    }
}

/// Copy `history` with exactly one system turn, at position 0.
///
/// An existing system turn wins over `system`; any further system turns are
/// dropped.
pub fn prepare_history(history: &[Turn], system: &str) -> Vec<Turn> {
    let system_turn = history
        .iter()
        .find(|t| t.role == Role::System)
        .cloned()
        .unwrap_or_else(|| Turn::system(system));

    let mut prepared = Vec::with_capacity(history.len() + 2);
    prepared.push(system_turn);
    prepared.extend(history.iter().filter(|t| t.role != Role::System).cloned());
    prepared
}
