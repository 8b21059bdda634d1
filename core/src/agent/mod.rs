//! Conversational agent split into smaller files for readability.
//! - checkpoint.rs: per-thread conversation state and its store
//! - persona.rs: representative system prompt and refusal text
//! - summarizer.rs: token-threshold history summarization
//! - token_counter.rs: approximate token counting
//! - runtime.rs: ToolCallingAgent, the tool-use loop

pub mod checkpoint;
pub mod persona;
pub mod summarizer;
pub mod token_counter;

mod runtime;

pub use checkpoint::{CheckpointStore, ConversationState, InMemoryCheckpointStore, SummaryBookkeeping};
pub use persona::{persona_prompt, rejection_message, DEFAULT_SUBJECT_NAME};
pub use runtime::ToolCallingAgent;
pub use summarizer::{SummarizationConfig, Summarizer};
pub use token_counter::{ApproxTokenCounter, TokenCounter};

use crate::llm::{ChatMessage, ToolCall};
use crate::Result;
use async_trait::async_trait;

/// Agent settings
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Person the agent represents
    pub subject_name: String,
    /// Upper bound on model turns per invocation
    pub max_iterations: usize,
    pub tool_timeout_ms: u64,
    pub summarization: SummarizationConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            subject_name: std::env::var("HERALD_SUBJECT_NAME")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SUBJECT_NAME.to_string()),
            max_iterations: 25,
            tool_timeout_ms: 30_000,
            summarization: SummarizationConfig::default(),
        }
    }
}

/// Messages of a thread after one invocation
#[derive(Debug, Clone)]
pub struct AgentResponse {
    pub thread_id: String,
    pub messages: Vec<ChatMessage>,
    /// Tool calls made during this invocation, in execution order
    pub tool_calls: Vec<ToolCall>,
}

impl AgentResponse {
    /// Response consisting of a single assistant message
    pub fn single(thread_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            messages: vec![ChatMessage::assistant(text)],
            tool_calls: Vec::new(),
        }
    }

    /// Text of the last message, the externally visible answer
    pub fn final_text(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

/// Answers a question within a conversation thread
#[async_trait]
pub trait Agent: Send + Sync {
    async fn invoke(&self, query: &str, thread_id: &str) -> Result<AgentResponse>;
}
