//! System instruction for the ReAct protocol.

use crate::tools::ToolSpec;

const REACT_HEADER: &str =
    "Answer the following questions as best you can. You have access to the following tools:";

/// Render one tool entry.
fn describe_tool(spec: &ToolSpec) -> String {
    let name = &spec.internal_name;
    let display = &spec.display_name;
    let description = &spec.description;
    let parameters = spec.parameters_json();
    format!(
        "{name}: Call this tool to interact with the {display} API. \
         What is the {display} API useful for? {description} \
         Parameters: {parameters} Format the arguments as a JSON object."
    )
}

/// Build the fixed system instruction describing the response format and
/// the available tools.
///
/// Pure and deterministic. An empty slice yields an instruction with no tool
/// entries and an empty action list.
pub fn build_system_instruction(specs: &[ToolSpec]) -> String {
    let tool_description = specs
        .iter()
        .map(describe_tool)
        .collect::<Vec<_>>()
        .join("\n\n");
    let tool_names = specs
        .iter()
        .map(|s| s.internal_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{REACT_HEADER}

{tool_description}

Use the following format:
Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
Thought: I now know the final answer
Final Answer: the final answer to the original input question
"
    )
}
