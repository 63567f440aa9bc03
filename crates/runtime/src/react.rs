//! The ReAct loop and its tool-call parser.
//!
//! A turn runs the model once. If its output ends in an `Action` /
//! `Action Input` pair, the named tool is executed, its observation is
//! spliced in place of anything the model wrote after the action input, and
//! the model runs a second time to produce the final answer. At most one
//! tool call is serviced per turn.

use tracing::{debug, info};

use crate::Result;
use crate::model::{CompletionEngine, CompletionRequest, Turn, Usage};
use crate::prompt::build_system_instruction;
use crate::tools::ToolRegistry;

pub const QUESTION_MARKER: &str = "\nQuestion:";
pub const ACTION_MARKER: &str = "\nAction:";
pub const ACTION_INPUT_MARKER: &str = "\nAction Input:";
pub const OBSERVATION_MARKER: &str = "\nObservation:";
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

/// A tool call extracted from model output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCall {
    pub tool_name: String,
    /// Arguments exactly as the model wrote them (relaxed JSON).
    pub raw_args: String,
    /// Whether an `Action` marker was followed by an `Action Input` marker.
    pub matched: bool,
}

impl ToolCall {
    /// Whether the call names a tool and should be dispatched.
    pub fn is_actionable(&self) -> bool {
        self.matched && !self.tool_name.is_empty()
    }
}

/// Extract the last tool call from `text`.
///
/// Returns the call and the text cut just before the observation marker
/// that follows the action input. When the model stopped without writing an
/// observation marker, one is appended to the right-trimmed text and the cut
/// happens there; when it wrote one (and possibly a made-up observation),
/// everything from that marker on is dropped. Without an `Action` marker
/// followed by an `Action Input` marker the call is unmatched and the text is
/// returned unchanged.
pub fn parse_last_call(text: &str) -> (ToolCall, String) {
    let action = text.rfind(ACTION_MARKER);
    let input = text.rfind(ACTION_INPUT_MARKER);
    let observation = text.rfind(OBSERVATION_MARKER);

    let (i, j) = match (action, input) {
        (Some(i), Some(j)) if i < j => (i, j),
        _ => return (ToolCall::default(), text.to_string()),
    };

    let (text, k) = match observation {
        Some(k) if k > j => (text.to_string(), k),
        _ => {
            let trimmed = text.trim_end();
            (format!("{trimmed}{OBSERVATION_MARKER}"), trimmed.len())
        }
    };

    let call = ToolCall {
        tool_name: text[i + ACTION_MARKER.len()..j].trim().to_string(),
        raw_args: text[j + ACTION_INPUT_MARKER.len()..k].trim().to_string(),
        matched: true,
    };
    let truncated = text[..k].to_string();
    (call, truncated)
}

/// The text after the last `Final Answer:` marker, trimmed, or the whole
/// trimmed text when there is none.
pub fn final_answer(text: &str) -> &str {
    match text.rfind(FINAL_ANSWER_MARKER) {
        Some(pos) => text[pos + FINAL_ANSWER_MARKER.len()..].trim(),
        None => text.trim(),
    }
}

/// Outcome of one question/answer exchange.
#[derive(Debug, Clone)]
pub struct LoopResult {
    /// Model text to show the user (see [`final_answer`]).
    pub final_text: String,
    /// The history to pass into the next turn.
    pub history: Vec<Turn>,
    /// The tool call serviced during this turn, if any.
    pub tool_call: Option<ToolCall>,
    /// Token usage summed over both completion passes.
    pub usage: Usage,
}

/// Drives a completion engine through the ReAct protocol.
///
/// The system instruction is rendered once from the registry at
/// construction. The agent keeps no conversation state: history is passed
/// into [`run_turn`](Self::run_turn) and a new history is returned.
pub struct Agent<E> {
    engine: E,
    tools: ToolRegistry,
    system: String,
}

impl<E: CompletionEngine> Agent<E> {
    pub fn new(engine: E, tools: ToolRegistry) -> Self {
        let system = build_system_instruction(tools.specs());
        Self {
            engine,
            tools,
            system,
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Answer one question.
    ///
    /// Tool failures are reported to the model as error observations; only
    /// completion engine failures are returned as errors.
    pub async fn run_turn(&self, question: &str, history: &[Turn]) -> Result<LoopResult> {
        let prompt = format!("{QUESTION_MARKER}{question}");

        let first = self
            .engine
            .complete(CompletionRequest {
                prompt: &prompt,
                history,
                system: &self.system,
            })
            .await?;

        let (call, truncated) = parse_last_call(&first.text);
        debug!(matched = call.matched, tool = %call.tool_name, "parsed first completion");

        if !call.is_actionable() {
            let final_text = if truncated.is_empty() {
                first.text
            } else {
                truncated
            };
            return Ok(LoopResult {
                final_text,
                history: first.history,
                tool_call: None,
                usage: first.usage,
            });
        }

        info!(tool = %call.tool_name, "dispatching tool call");
        let observation = self.tools.observe(&call.tool_name, &call.raw_args).await;
        let resumed = truncated + &observation;

        let second = self
            .engine
            .complete(CompletionRequest {
                prompt: &resumed,
                history: &first.history,
                system: &self.system,
            })
            .await?;

        Ok(LoopResult {
            final_text: second.text,
            history: second.history,
            tool_call: Some(call),
            usage: Usage {
                input_tokens: first.usage.input_tokens + second.usage.input_tokens,
                output_tokens: first.usage.output_tokens + second.usage.output_tokens,
            },
        })
    }
}
