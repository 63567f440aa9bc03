//! End-to-end turns through the agent loop with a scripted backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use runtime::tools::FnTool;
use runtime::{
    Agent, Backend, Error, ModelError, ModelRequest, ModelResponse, ParamType, ParameterSpec,
    Role, ToolError, ToolRegistry, ToolSpec, Turn, Usage, final_answer,
};
use serde_json::Value;

/// Replays canned responses and records every request.
#[derive(Default)]
struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedBackend {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| Ok(r.to_string())).collect()),
            requests: Mutex::default(),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([Err(message.to_string())])),
            requests: Mutex::default(),
        }
    }

    fn requests(&self) -> Vec<Vec<Turn>> {
        self.requests.lock().unwrap().clone()
    }
}

impl Backend for ScriptedBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        self.requests.lock().unwrap().push(request.messages.to_vec());
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected completion call");
        match next {
            Ok(text) => Ok(ModelResponse {
                text,
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 5,
                },
            }),
            Err(message) => Err(ModelError::Network(message)),
        }
    }
}

fn weather_tool(calls: Arc<AtomicUsize>, seen: Arc<Mutex<Vec<Value>>>) -> FnTool {
    let spec = ToolSpec::new("query_weather", "Weather Query", "Current weather for a city.")
        .param(ParameterSpec::required("city", ParamType::String, "City"))
        .param(ParameterSpec::required("province", ParamType::String, "Province"));
    FnTool::new(spec, move |args| {
        calls.fetch_add(1, Ordering::SeqCst);
        seen.lock().unwrap().push(Value::Object(args.clone()));
        Ok(format!("{}: sunny, 25°C", args["city"].as_str().unwrap_or_default()))
    })
}

fn weather_registry() -> (ToolRegistry, Arc<AtomicUsize>, Arc<Mutex<Vec<Value>>>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let registry = ToolRegistry::builder()
        .register(weather_tool(calls.clone(), seen.clone()))
        .build()
        .unwrap();
    (registry, calls, seen)
}

const WEATHER_CALL: &str = "Thought: need weather\nAction: query_weather\n\
                            Action Input: {\"city\":\"Chengdu\",\"province\":\"Sichuan\"}";

#[tokio::test]
async fn tool_call_runs_once_and_resumes_with_observation() {
    let (registry, calls, seen) = weather_registry();
    let backend = ScriptedBackend::new(&[
        WEATHER_CALL,
        "Thought: I now know the final answer\nFinal Answer: Sunny and 25°C in Chengdu.",
    ]);
    let agent = Agent::new(backend, registry);

    let result = agent
        .run_turn("What is the weather in Chengdu?", &[])
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(seen.lock().unwrap()[0]["province"], "Sichuan");
    assert!(result.final_text.contains("Final Answer:"));
    assert_eq!(final_answer(&result.final_text), "Sunny and 25°C in Chengdu.");
    assert_eq!(result.tool_call.unwrap().tool_name, "query_weather");
    assert_eq!(result.usage.total_tokens(), 30);

    let requests = agent.engine().requests();
    assert_eq!(requests.len(), 2);

    let first = &requests[0];
    assert_eq!(first[0], Turn::system(agent.system_instruction()));
    assert_eq!(first[1], Turn::user("\nQuestion:What is the weather in Chengdu?"));

    // The second pass sees the first exchange, then the resumed text.
    let second = &requests[1];
    assert_eq!(second.len(), 4);
    assert_eq!(second[2], Turn::assistant(WEATHER_CALL));
    assert_eq!(
        second[3],
        Turn::user(format!("{WEATHER_CALL}\nObservation: Chengdu: sunny, 25°C"))
    );

    let roles: Vec<Role> = result.history.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        [
            Role::System,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant
        ]
    );
}

#[tokio::test]
async fn direct_answer_makes_one_completion_call() {
    let (registry, calls, _) = weather_registry();
    let backend = ScriptedBackend::new(&["Thought: trivial\nFinal Answer: 4"]);
    let agent = Agent::new(backend, registry);

    let result = agent.run_turn("2+2?", &[]).await.unwrap();

    assert_eq!(result.final_text, "Thought: trivial\nFinal Answer: 4");
    assert_eq!(final_answer(&result.final_text), "4");
    assert!(result.tool_call.is_none());
    assert_eq!(result.history.len(), 3);
    assert_eq!(agent.engine().requests().len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_action_name_ends_turn_with_truncated_text() {
    let (registry, calls, _) = weather_registry();
    let backend = ScriptedBackend::new(&[
        "Thought: ?\nAction: \nAction Input: {}\nObservation: x\nFinal Answer: y",
    ]);
    let agent = Agent::new(backend, registry);

    let result = agent.run_turn("anything?", &[]).await.unwrap();

    // Matched but not actionable: the text is cut at the observation, so the
    // model's own final answer is dropped along with it.
    assert_eq!(result.final_text, "Thought: ?\nAction: \nAction Input: {}");
    assert!(result.tool_call.is_none());
    assert_eq!(agent.engine().requests().len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        result.history.last(),
        Some(&Turn::assistant(
            "Thought: ?\nAction: \nAction Input: {}\nObservation: x\nFinal Answer: y"
        ))
    );
}

#[tokio::test]
async fn unknown_tool_becomes_error_observation() {
    let (registry, calls, _) = weather_registry();
    let backend = ScriptedBackend::new(&[
        "Thought: launch\nAction: launch_rocket\nAction Input: {}",
        "Thought: that tool does not exist\nFinal Answer: I cannot do that.",
    ]);
    let agent = Agent::new(backend, registry);

    let result = agent.run_turn("Launch a rocket", &[]).await.unwrap();

    assert_eq!(final_answer(&result.final_text), "I cannot do that.");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let requests = agent.engine().requests();
    let resumed = &requests[1].last().unwrap().content;
    assert!(
        resumed.ends_with("\nObservation: Error: tool not found: launch_rocket"),
        "{resumed}"
    );
}

#[tokio::test]
async fn malformed_arguments_become_error_observation() {
    let (registry, calls, _) = weather_registry();
    let backend = ScriptedBackend::new(&[
        "Thought: go\nAction: query_weather\nAction Input: {city: \"Chengdu\"",
        "Final Answer: sorry",
    ]);
    let agent = Agent::new(backend, registry);

    agent.run_turn("weather?", &[]).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let requests = agent.engine().requests();
    let resumed = &requests[1].last().unwrap().content;
    assert!(resumed.contains("\nObservation: Error: invalid arguments:"), "{resumed}");
}

#[tokio::test]
async fn failing_tool_becomes_error_observation() {
    let spec = ToolSpec::new("query_time", "Time Query", "Current time.");
    let registry = ToolRegistry::builder()
        .register(FnTool::new(spec, |_| {
            Err(ToolError::Execution("clock unavailable".into()))
        }))
        .build()
        .unwrap();
    let backend = ScriptedBackend::new(&[
        "Action: query_time\nAction Input: {}",
        "Final Answer: unknown",
    ]);
    let agent = Agent::new(backend, registry);

    let result = agent.run_turn("time?", &[]).await.unwrap();

    assert_eq!(final_answer(&result.final_text), "unknown");
    let requests = agent.engine().requests();
    assert!(
        requests[1]
            .last()
            .unwrap()
            .content
            .ends_with("\nObservation: Error: execution failed: clock unavailable")
    );
}

#[tokio::test]
async fn second_action_is_not_dispatched() {
    let (registry, calls, _) = weather_registry();
    let chained = "Thought: also Beijing\nAction: query_weather\n\
                   Action Input: {\"city\":\"Beijing\",\"province\":\"Beijing\"}";
    let backend = ScriptedBackend::new(&[WEATHER_CALL, chained]);
    let agent = Agent::new(backend, registry);

    let result = agent.run_turn("Weather in two cities?", &[]).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(agent.engine().requests().len(), 2);
    assert_eq!(result.final_text, chained);
}

#[tokio::test]
async fn hallucinated_observation_is_replaced() {
    let (registry, _, _) = weather_registry();
    let backend = ScriptedBackend::new(&[
        "Thought: go\nAction: query_weather\n\
         Action Input: {city: 'Chengdu', province: 'Sichuan'}\n\
         Observation: snowing\nFinal Answer: snow",
        "Final Answer: sunny",
    ]);
    let agent = Agent::new(backend, registry);

    agent.run_turn("weather?", &[]).await.unwrap();

    let requests = agent.engine().requests();
    let resumed = &requests[1].last().unwrap().content;
    assert!(!resumed.contains("snowing"));
    assert!(resumed.ends_with(
        "Action Input: {city: 'Chengdu', province: 'Sichuan'}\nObservation: Chengdu: sunny, 25°C"
    ));
}

#[tokio::test]
async fn completion_failure_propagates() {
    let agent = Agent::new(ScriptedBackend::failing("connection refused"), ToolRegistry::empty());

    let err = agent.run_turn("hello", &[]).await.unwrap_err();

    assert!(matches!(err, Error::Model(ModelError::Network(_))));
}

#[tokio::test]
async fn history_threads_across_turns() {
    let backend = ScriptedBackend::new(&["Final Answer: hi", "Final Answer: again"]);
    let agent = Agent::new(backend, ToolRegistry::empty());

    let first = agent.run_turn("hello", &[]).await.unwrap();
    let second = agent.run_turn("hello again", &first.history).await.unwrap();

    assert_eq!(second.history.len(), 5);
    let systems = second
        .history
        .iter()
        .filter(|t| t.role == Role::System)
        .count();
    assert_eq!(systems, 1);

    let requests = agent.engine().requests();
    assert_eq!(requests[1][..3], first.history[..]);
}
