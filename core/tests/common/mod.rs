//! Shared fakes for herald-core integration tests.
//!
//! - `ScriptedModel`: replays queued model replies and records every request
//! - `RecordingStore`: context store returning fixed documents or an error,
//!   optionally after a delay
//! - `CountingTool`: tool that counts invocations

#![allow(dead_code)]

use async_trait::async_trait;
use herald_core::context_store::ContextStore;
use herald_core::llm::{ChatMessage, ChatModel, Completion, CompletionRequest, ToolCall};
use herald_core::tools::{Tool, ToolResult};
use herald_core::{HeraldError, Result};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Model that answers from a queue of scripted replies
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ChatMessage>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_text(&self, text: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(ChatMessage::assistant(text)));
    }

    pub fn push_tool_call(&self, id: &str, name: &str, arguments: Value) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(ChatMessage::assistant_with_tools(
                "",
                vec![ToolCall {
                    id: id.to_string(),
                    name: name.to_string(),
                    arguments,
                }],
            )));
    }

    pub fn push_error(&self, detail: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(HeraldError::Llm(detail.to_string())));
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, i: usize) -> CompletionRequest {
        self.requests.lock().unwrap()[i].clone()
    }

    pub fn last_request(&self) -> CompletionRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("model was never called")
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(HeraldError::Llm("script exhausted".into())));
        reply.map(Completion::from_message)
    }
}

/// Context store returning a fixed outcome and recording each query
pub struct RecordingStore {
    outcome: std::result::Result<Vec<String>, String>,
    delay: Option<Duration>,
    pub queries: Mutex<Vec<(String, String, usize)>>,
}

impl RecordingStore {
    pub fn with_docs(docs: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(docs.iter().map(|d| d.to_string()).collect()),
            delay: None,
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Store that answers with `docs` only after `delay`
    pub fn slow(docs: &[&str], delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(docs.iter().map(|d| d.to_string()).collect()),
            delay: Some(delay),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(detail: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(detail.to_string()),
            delay: None,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl ContextStore for RecordingStore {
    async fn query(&self, collection: &str, text: &str, n_results: usize) -> Result<Vec<String>> {
        self.queries
            .lock()
            .unwrap()
            .push((collection.to_string(), text.to_string(), n_results));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.outcome {
            Ok(docs) => Ok(docs.iter().take(n_results).cloned().collect()),
            Err(detail) => Err(HeraldError::ContextStore(detail.clone())),
        }
    }
}

/// Tool that records how often it ran
pub struct CountingTool {
    name: String,
    pub calls: AtomicUsize,
}

impl CountingTool {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for CountingTool {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Counting tool {}", self.name)
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn call(&self, _arguments: Value) -> ToolResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"results": [], "count": 0}))
    }
}
