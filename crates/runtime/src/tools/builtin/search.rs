//! Web search through the Google Custom Search JSON API.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::tools::{ParamType, ParameterSpec, Tool, ToolArgs, ToolError, ToolSpec};

const SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";
const DEFAULT_NUM_RESULTS: u32 = 5;
const NO_RESULTS: &str = "No good Google Search Result was found";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

/// Google Custom Search JSON API.
#[derive(Debug)]
pub struct GoogleSearch {
    spec: ToolSpec,
    client: reqwest::Client,
    api_key: Option<String>,
    engine_id: Option<String>,
    num_results: u32,
}

impl GoogleSearch {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        engine_id: Option<String>,
    ) -> Self {
        let spec = ToolSpec::new(
            "google_search",
            "Google Search",
            "Google Search is a general search engine that can be used to access the internet, \
             query encyclopedic knowledge, and learn about current events.",
        )
        .param(ParameterSpec::required(
            "search_query",
            ParamType::String,
            "Search query or phrase to look up on Google Search.",
        ));

        Self {
            spec,
            client,
            api_key,
            engine_id,
            num_results: DEFAULT_NUM_RESULTS,
        }
    }

    /// Number of results to request (1-10).
    pub fn with_num_results(mut self, num_results: u32) -> Self {
        self.num_results = num_results.clamp(1, 10);
        self
    }

    fn request_url(&self, query: &str) -> Result<Url, ToolError> {
        let (Some(key), Some(cx)) = (&self.api_key, &self.engine_id) else {
            return Err(ToolError::Execution(
                "google search is not configured: set tools.google_search.api_key and engine_id"
                    .into(),
            ));
        };

        let num = self.num_results.to_string();
        Url::parse_with_params(
            SEARCH_URL,
            &[
                ("key", key.as_str()),
                ("cx", cx.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ],
        )
        .map_err(|e| ToolError::Execution(format!("invalid search url: {e}")))
    }
}

fn format_results(response: SearchResponse) -> String {
    if response.items.is_empty() {
        return NO_RESULTS.to_string();
    }
    response
        .items
        .into_iter()
        .map(|item| format!("{}\n{}\n{}", item.title, item.snippet.trim(), item.link))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl Tool for GoogleSearch {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, args: ToolArgs) -> Result<String, ToolError> {
        let query = args
            .get("search_query")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let url = self.request_url(query)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::Execution(format!("search request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Execution(format!("search api {status}: {body}")));
        }

        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| ToolError::Execution(format!("invalid search response: {e}")))?;

        Ok(format_results(results))
    }
}
