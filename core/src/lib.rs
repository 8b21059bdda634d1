// Herald Core Library
// Personal representative agent: guardrail, retrieval and tool-calling runtime

pub mod agent;
pub mod config;
pub mod context_store;
pub mod guardrail;
pub mod llm;
pub mod orchestrator;
pub mod tools;

// Export core types
pub use agent::{Agent, AgentResponse, CheckpointStore, InMemoryCheckpointStore, ToolCallingAgent};
pub use config::HeraldConfig;
pub use context_store::{ContextRetriever, ContextStore};
pub use guardrail::{Classifier, Decision, LlmGuardrail};
pub use llm::{ChatMessage, ChatModel, LlmClient, Role};
pub use orchestrator::{QueryError, QueryOrchestrator, QueryOutcome};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeraldError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Context store error: {0}")]
    ContextStore(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
pub type Result<T> = std::result::Result<T, HeraldError>;
