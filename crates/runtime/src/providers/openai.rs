//! OpenAI-compatible `/chat/completions` backend.
//!
//! Targets self-hosted servers (vLLM, Ollama, llama.cpp) as well as hosted
//! OpenAI-style APIs. Qwen3-style reasoning output wrapped in
//! `<think>...</think>` is stripped before the text is returned.

use crate::model::{Backend, ModelError, ModelRequest, ModelResponse, Role, Turn, Usage};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const THINK_END: &str = "</think>";

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_template_kwargs: Option<TemplateKwargs>,
}

#[derive(Debug, Serialize)]
struct TemplateKwargs {
    enable_thinking: bool,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Builder for creating an OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiBackendBuilder {
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    enable_thinking: Option<bool>,
    timeout: Option<Duration>,
}

impl OpenAiBackendBuilder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            max_tokens: 4096,
            enable_thinking: None,
            timeout: None,
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Pass `enable_thinking` through the chat template (Qwen3).
    pub fn enable_thinking(mut self, enable: bool) -> Self {
        self.enable_thinking = Some(enable);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<OpenAiBackend, ModelError> {
        let mut client = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }
        let client = client
            .build()
            .map_err(|e| ModelError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(OpenAiBackend {
            client,
            base_url: self.base_url,
            model: self.model,
            api_key: self.api_key,
            max_tokens: self.max_tokens,
            enable_thinking: self.enable_thinking,
        })
    }
}

/// OpenAI-compatible chat completions backend.
pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    enable_thinking: Option<bool>,
}

impl OpenAiBackend {
    pub fn builder(base_url: impl Into<String>, model: impl Into<String>) -> OpenAiBackendBuilder {
        OpenAiBackendBuilder::new(base_url, model)
    }

    fn build_request<'a>(&'a self, messages: &'a [Turn]) -> ApiRequest<'a> {
        ApiRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: messages
                .iter()
                .map(|t| ApiMessage {
                    role: t.role,
                    content: &t.content,
                })
                .collect(),
            chat_template_kwargs: self
                .enable_thinking
                .map(|enable_thinking| TemplateKwargs { enable_thinking }),
        }
    }
}

impl std::fmt::Display for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "openai({}, {})", self.model, self.base_url)
    }
}

impl Backend for OpenAiBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let url = format!("{}/chat/completions", self.base_url);
        let api_request = self.build_request(request.messages);

        let mut req = self
            .client
            .post(&url)
            .header("content-type", "application/json");
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = req
            .json(&api_request)
            .send()
            .await
            .map_err(ModelError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("no choices in response".into()))?
            .message
            .content
            .unwrap_or_default();

        let usage = api_response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(ModelResponse {
            text: strip_thinking(&content).to_string(),
            usage,
        })
    }
}

/// Drop everything up to and including the last `</think>`, then trim
/// surrounding newlines.
pub fn strip_thinking(text: &str) -> &str {
    let answer = match text.rfind(THINK_END) {
        Some(end) => &text[end + THINK_END.len()..],
        None => text,
    };
    answer.trim_matches('\n')
}
