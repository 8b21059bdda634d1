use crate::{HeraldError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{debug, error};

use super::adapter::{
    extract_text_from_chat_completions, extract_usage, messages_to_chat_payload,
    parse_tool_calls_from_chat, response_format_payload, tools_to_chat_payload,
};
use super::types::{ChatMessage, Completion, CompletionRequest};

/// Configuration for LlmClient loaded from environment variables
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    pub base_url: String, // e.g., https://api.openai.com/v1
    pub model: String,    // e.g., gpt-4o
    pub embedding_model: String,
    pub api_key: Option<String>,
    pub request_timeout_ms: u64,
    pub temperature: f32,
}

impl Default for LlmClientConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: std::env::var("OPENAI_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "gpt-4o".to_string()),
            embedding_model: std::env::var("OPENAI_EMBEDDING_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "text-embedding-3-small".to_string()),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60_000),
            temperature: std::env::var("OPENAI_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse::<f32>().ok())
                .unwrap_or(0.7),
        }
    }
}

/// Anything that can answer a chat completion request.
///
/// The agent loop, the guardrail and the summarizer only talk to this trait,
/// so tests can script model replies without a network.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion>;
}

/// HTTP client for OpenAI-compatible chat completions and embeddings
#[derive(Clone)]
pub struct LlmClient {
    pub(crate) http: Client,
    pub(crate) cfg: LlmClientConfig,
}

impl LlmClient {
    pub fn new(cfg: LlmClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| HeraldError::Llm(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, cfg })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(LlmClientConfig::default())
    }

    pub fn config(&self) -> &LlmClientConfig {
        &self.cfg
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.cfg.base_url.trim_end_matches('/'), path)
    }

    pub(crate) fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .post(url)
            .header("content-type", "application/json");
        if let Some(key) = &self.cfg.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Build the chat.completions body for a request
    pub fn build_chat_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = json!({
            "model": self.cfg.model,
            "messages": messages_to_chat_payload(&request.messages),
            "temperature": request.temperature.unwrap_or(self.cfg.temperature),
        });
        if !request.tools.is_empty() {
            body["tools"] = json!(tools_to_chat_payload(&request.tools));
            // The model decides whether to call a tool
            body["tool_choice"] = json!("auto");
        }
        if let Some(schema) = &request.response_schema {
            body["response_format"] = response_format_payload(schema);
        }
        body
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    /// Contract:
    /// - Input: messages, optional tools and response schema
    /// - Output: one assistant message (text and/or tool calls)
    /// - Error: network, non-2xx status, or a reply with neither text nor tool calls
    #[tracing::instrument(name = "llm_client.complete", skip(self, request), fields(messages = request.messages.len(), tools = request.tools.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let url = self.endpoint("chat/completions");
        debug!(target: "llm_client", "POST {} via Chat Completions", url);

        let started = Instant::now();
        let body = self.build_chat_body(&request);
        let resp = self
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HeraldError::Llm(format!("Chat Completions HTTP error: {e}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!(target: "llm_client", %status, body = %text, "Chat Completions error");
            return Err(HeraldError::Llm(format!(
                "Chat Completions error: status={} body={}",
                status, text
            )));
        }

        let val: serde_json::Value = resp.json().await.map_err(|e| {
            HeraldError::Llm(format!("Failed to parse Chat Completions JSON: {e}"))
        })?;
        let tool_calls = parse_tool_calls_from_chat(&val);
        let text = extract_text_from_chat_completions(&val);
        if tool_calls.is_empty() && text.is_none() {
            return Err(HeraldError::Llm(
                "Missing choices[0].message.content in chat completions".into(),
            ));
        }

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(target: "llm_client", latency_ms = %latency_ms, tool_calls = tool_calls.len(), "Chat Completions finished");

        Ok(Completion {
            message: ChatMessage::assistant_with_tools(text.unwrap_or_default(), tool_calls),
            model: val
                .get("model")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            usage: extract_usage(&val),
        })
    }
}
