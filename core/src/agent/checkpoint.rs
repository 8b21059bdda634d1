//! Conversation checkpoints keyed by thread id.

use crate::llm::ChatMessage;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Summarization bookkeeping carried with a thread
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryBookkeeping {
    /// Approximate history size at the last threshold check
    pub last_token_count: usize,
    /// How many times this thread has been summarized
    pub summaries: u32,
    /// Most recent messages exempt from summarization
    pub messages_to_keep: usize,
}

/// Everything remembered about one conversation thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub thread_id: String,
    pub messages: Vec<ChatMessage>,
    pub summary: SummaryBookkeeping,
    pub updated_at: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            messages: Vec::new(),
            summary: SummaryBookkeeping::default(),
            updated_at: Utc::now(),
        }
    }
}

/// Storage for per-thread conversation state.
///
/// `put` replaces the whole state of a thread; concurrent writers to the same
/// thread resolve as last-write-wins.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn get(&self, thread_id: &str) -> Result<Option<ConversationState>>;

    async fn put(&self, state: ConversationState) -> Result<()>;

    async fn thread_count(&self) -> Result<usize>;
}

/// In-memory implementation of CheckpointStore.
///
/// Uses DashMap for concurrent access. State lives as long as the process.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    threads: DashMap<String, ConversationState>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn get(&self, thread_id: &str) -> Result<Option<ConversationState>> {
        Ok(self.threads.get(thread_id).map(|s| s.clone()))
    }

    async fn put(&self, mut state: ConversationState) -> Result<()> {
        state.updated_at = Utc::now();
        trace!(target: "checkpoint", thread_id = %state.thread_id, messages = state.messages.len(), "Checkpoint saved");
        self.threads.insert(state.thread_id.clone(), state);
        Ok(())
    }

    async fn thread_count(&self) -> Result<usize> {
        Ok(self.threads.len())
    }
}
