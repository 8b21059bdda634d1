//! Context store adapter
//!
//! `ContextStore` is the typed seam over the vector database: it either
//! returns ranked documents or an error. `ContextRetriever` sits on top and
//! turns every outcome into text, since the agent consumes retrieval output
//! as ordinary tool output and a failed lookup must not abort a conversation.

mod chroma;

pub use chroma::{check_dimension, ChromaCloudStore, ChromaConfig, CollectionInfo};

use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Returned when the store answers with zero matches
pub const NO_DOCUMENTS_FOUND: &str = "No documents found for the given query.";

/// Prefix of every retrieval failure message
pub const RETRIEVAL_ERROR_PREFIX: &str = "Error accessing ChromaDB collection:";

/// Default collection holding the subject's background documents
pub const DEFAULT_COLLECTION: &str = "context_data";

pub const DEFAULT_N_RESULTS: usize = 3;

/// Similarity search over a named document collection
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Up to `n_results` documents most similar to `text`, in store relevance order
    async fn query(&self, collection: &str, text: &str, n_results: usize) -> Result<Vec<String>>;
}

/// Text-only facade over a `ContextStore`
#[derive(Clone)]
pub struct ContextRetriever {
    store: Arc<dyn ContextStore>,
    collection: String,
}

impl ContextRetriever {
    pub fn new(store: Arc<dyn ContextStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Failure text for a retrieval that did not finish within `limit`
    pub fn timeout_message(&self, limit: Duration) -> String {
        format!(
            "{} query on '{}' timed out after {}ms",
            RETRIEVAL_ERROR_PREFIX,
            self.collection,
            limit.as_millis()
        )
    }

    /// Retrieve context for `query`. Never fails: an empty result and any
    /// store error are both reported as text.
    #[tracing::instrument(name = "context_retriever.retrieve", skip(self), fields(collection = %self.collection))]
    pub async fn retrieve(&self, query: &str, n_results: usize) -> String {
        match self.store.query(&self.collection, query, n_results).await {
            Ok(docs) if docs.is_empty() => {
                debug!(target: "context_store", "No documents matched");
                NO_DOCUMENTS_FOUND.to_string()
            }
            Ok(docs) => {
                debug!(target: "context_store", count = docs.len(), "Retrieved documents");
                docs.join("\n\n")
            }
            Err(e) => {
                warn!(target: "context_store", error = %e, "Context retrieval failed");
                format!("{} {}", RETRIEVAL_ERROR_PREFIX, e)
            }
        }
    }
}
