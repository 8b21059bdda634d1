//! LLM module: HTTP client, wire adapter and message types
//!
//! This module provides:
//! - `LlmClientConfig`, `LlmClient` for talking to OpenAI-compatible backends
//! - `ChatModel` trait used by the guardrail, the agent loop and the summarizer
//! - `Embedder` trait used by the context store to embed query text, with
//!   OpenAI-compatible and (feature `local-embeddings`) local MiniLM backends
//! - chat.completions payload builders and tool-call parsers

mod adapter;
mod client;
mod embeddings;
#[cfg(feature = "local-embeddings")]
mod local;
mod types;

pub use adapter::{
    extract_text_from_chat_completions, messages_to_chat_payload, parse_tool_calls_from_chat,
    tools_to_chat_payload,
};
pub use client::{ChatModel, LlmClient, LlmClientConfig};
pub use embeddings::{embedder_for, Embedder, EmbedderKind};
#[cfg(feature = "local-embeddings")]
pub use local::MiniLmEmbedder;
pub use types::{
    ChatMessage, Completion, CompletionRequest, ResponseSchema, Role, ToolCall, ToolSpec, Usage,
};
