//! Built-in tools: web search, weather and time lookups.

mod search;
mod time;
mod weather;

pub use search::GoogleSearch;
pub use time::QueryTime;
pub use weather::QueryWeather;

use super::{ToolError, ToolRegistry};
use std::time::Duration;

/// Settings for the built-in tool set.
#[derive(Debug, Clone)]
pub struct BuiltinConfig {
    /// Google Custom Search API key.
    pub google_api_key: Option<String>,
    /// Google Programmable Search Engine ID (`cx`).
    pub google_engine_id: Option<String>,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl Default for BuiltinConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            google_engine_id: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Build a registry holding `google_search`, `query_weather` and
/// `query_time`.
pub fn registry(config: &BuiltinConfig) -> Result<ToolRegistry, ToolError> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| ToolError::Registration(format!("failed to build HTTP client: {e}")))?;

    ToolRegistry::builder()
        .register(GoogleSearch::new(
            client.clone(),
            config.google_api_key.clone(),
            config.google_engine_id.clone(),
        ))
        .register(QueryWeather::new(client))
        .register(QueryTime::new())
        .build()
}
