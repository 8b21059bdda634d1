use crate::tools::{Tool, ToolError, ToolResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub const WEB_SEARCH_TOOL: &str = "tavily_search";

/// Web search settings
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Register the search tool with the agent
    pub enabled: bool,
    pub api_key: Option<String>,
    pub api_endpoint: String,
    pub max_results: usize,
    pub timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: std::env::var("HERALD_SEARCH_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            api_key: std::env::var("TAVILY_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            api_endpoint: "https://api.tavily.com/search".to_string(),
            max_results: 5,
            timeout_ms: 15_000,
        }
    }
}

/// Search result item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: Option<String>,
}

/// Tavily Search API response structures
#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    #[serde(default)]
    content: Option<String>,
}

/// Web search tool using the Tavily Search API
pub struct WebSearchTool {
    config: SearchConfig,
    http_client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(config: SearchConfig) -> Self {
        if config.api_key.is_some() {
            tracing::info!(target: "web_search", "Tavily API key configured");
        } else {
            warn!(target: "web_search", "TAVILY_API_KEY not set, web search will not work");
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent("herald-agent/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            http_client,
        }
    }

    async fn search_tavily(
        &self,
        query: &str,
        max_results: usize,
    ) -> ToolResult<(Option<String>, Vec<SearchResult>)> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            ToolError::ExecutionFailed(
                "TAVILY_API_KEY not configured. Set it in environment or herald.toml".to_string(),
            )
        })?;

        debug!(target: "web_search", query = %query, max_results = %max_results, "Performing Tavily search");

        let body = json!({
            "query": query,
            "max_results": max_results,
            "search_depth": "basic",
        });

        let resp = self
            .http_client
            .post(&self.config.api_endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "web_search", error = %e, "Request failed");
                if e.is_timeout() {
                    ToolError::ExecutionFailed(format!("Search request timed out: {}", e))
                } else if e.is_connect() {
                    ToolError::ExecutionFailed(format!("Connection failed: {}", e))
                } else {
                    ToolError::ExecutionFailed(format!("Search request failed: {}", e))
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ToolError::ExecutionFailed(format!(
                "Tavily Search API error: {} - {}",
                status, body
            )));
        }

        let data: TavilySearchResponse = resp.json().await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Failed to parse search response: {}", e))
        })?;

        let results: Vec<SearchResult> = data
            .results
            .into_iter()
            .map(|r| SearchResult {
                title: r.title,
                url: r.url,
                snippet: r.content,
            })
            .collect();

        debug!(target: "web_search", result_count = %results.len(), "Search completed");

        Ok((data.answer, results))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> String {
        WEB_SEARCH_TOOL.to_string()
    }

    fn description(&self) -> String {
        "Search the web for public information. Never use this for contact information."
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results (default: 5, max: 20)"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query'".to_string()))?;

        let max_results = arguments["max_results"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(self.config.max_results)
            .clamp(1, 20);

        let (answer, results) = self.search_tavily(query, max_results).await?;

        Ok(json!({
            "query": query,
            "answer": answer,
            "results": results,
            "count": results.len()
        }))
    }
}
