use crate::llm::{Embedder, EmbedderKind};
use crate::{HeraldError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::{ContextStore, DEFAULT_COLLECTION, DEFAULT_N_RESULTS};

/// Chroma Cloud connection settings
#[derive(Debug, Clone)]
pub struct ChromaConfig {
    pub host: String,
    pub api_key: Option<String>,
    pub tenant: String,
    pub database: String,
    pub collection: String,
    pub n_results: usize,
    pub request_timeout_ms: u64,
    /// Embedder used for query text; must match the collection's vectors
    pub embedder: EmbedderKind,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("CHROMA_HOST")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "https://api.trychroma.com".to_string()),
            api_key: std::env::var("CHROMA_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            tenant: std::env::var("CHROMA_TENANT").unwrap_or_default(),
            database: std::env::var("CHROMA_DATABASE").unwrap_or_default(),
            collection: std::env::var("CHROMA_COLLECTION")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            n_results: DEFAULT_N_RESULTS,
            request_timeout_ms: 15_000,
            embedder: std::env::var("CHROMA_EMBEDDER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CollectionModel {
    id: String,
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    configuration_json: Option<Value>,
}

/// What the store needs to know about a resolved collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub id: String,
    /// Vector size of stored embeddings; unknown until the first add
    pub dimension: Option<usize>,
    /// Embedding function the collection was created with, when recorded
    pub embedding_function: Option<String>,
}

impl From<CollectionModel> for CollectionInfo {
    fn from(model: CollectionModel) -> Self {
        let embedding_function = model
            .configuration_json
            .as_ref()
            .and_then(|c| c.pointer("/embedding_function/name"))
            .and_then(|n| n.as_str())
            .map(|n| n.to_string());
        Self {
            id: model.id,
            dimension: model.dimension,
            embedding_function,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
}

/// `ContextStore` backed by the Chroma v2 HTTP API.
///
/// The query text is embedded client-side through `Embedder`, so the
/// collection must have been populated with a compatible embedding model.
/// A vector size mismatch is reported before the query is sent.
pub struct ChromaCloudStore {
    config: ChromaConfig,
    http: reqwest::Client,
    embedder: Arc<dyn Embedder>,
    // Resolved once per process; a failed lookup is retried on the next query
    collection: OnceCell<CollectionInfo>,
}

impl ChromaCloudStore {
    pub fn new(config: ChromaConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent("herald-agent/0.1")
            .build()
            .map_err(|e| HeraldError::ContextStore(format!("Failed to build HTTP client: {e}")))?;

        if config.api_key.is_none() {
            warn!(target: "context_store", "CHROMA_API_KEY not set, context retrieval will not work");
        }

        Ok(Self {
            config,
            http,
            embedder,
            collection: OnceCell::new(),
        })
    }

    fn database_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}",
            self.config.host.trim_end_matches('/'),
            urlencoding::encode(&self.config.tenant),
            urlencoding::encode(&self.config.database),
        )
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => req.header("x-chroma-token", key),
            None => req,
        }
    }

    async fn resolve_collection(&self, name: &str) -> Result<CollectionInfo> {
        let url = format!(
            "{}/collections/{}",
            self.database_url(),
            urlencoding::encode(name)
        );
        debug!(target: "context_store", collection = %name, "Resolving collection");

        let resp = self
            .authorize(self.http.get(&url))
            .send()
            .await
            .map_err(|e| HeraldError::ContextStore(format!("Collection lookup failed: {e}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(HeraldError::ContextStore(format!(
                "Collection {} not available: {} - {}",
                name, status, body
            )));
        }

        let model: CollectionModel = resp.json().await.map_err(|e| {
            HeraldError::ContextStore(format!("Failed to parse collection response: {e}"))
        })?;
        let info = CollectionInfo::from(model);
        info!(
            target: "context_store",
            collection = %name,
            id = %info.id,
            dimension = ?info.dimension,
            embedding_function = ?info.embedding_function,
            "Collection resolved"
        );
        Ok(info)
    }

    /// Collection metadata; the configured collection is cached after the first success
    pub async fn collection_info(&self, name: &str) -> Result<CollectionInfo> {
        if name != self.config.collection {
            return self.resolve_collection(name).await;
        }
        self.collection
            .get_or_try_init(|| self.resolve_collection(name))
            .await
            .cloned()
    }
}

/// Reject a query vector the collection cannot be searched with
pub fn check_dimension(
    collection: &str,
    info: &CollectionInfo,
    embedder_model: &str,
    query_dimension: usize,
) -> Result<()> {
    match info.dimension {
        Some(expected) if expected != query_dimension => Err(HeraldError::ContextStore(format!(
            "Embedding dimension mismatch for collection '{}': it stores {}-dimensional vectors \
             (embedding function: {}), but query embedder '{}' produced {}. \
             Set chroma.embedder to match the collection.",
            collection,
            expected,
            info.embedding_function.as_deref().unwrap_or("unknown"),
            embedder_model,
            query_dimension
        ))),
        _ => Ok(()),
    }
}

#[async_trait]
impl ContextStore for ChromaCloudStore {
    async fn query(&self, collection: &str, text: &str, n_results: usize) -> Result<Vec<String>> {
        let info = self.collection_info(collection).await?;
        let embedding = self.embedder.embed(text).await?;
        check_dimension(collection, &info, &self.embedder.model_name(), embedding.len())?;

        let url = format!("{}/collections/{}/query", self.database_url(), info.id);
        let body = json!({
            "query_embeddings": [embedding],
            "n_results": n_results,
            "include": ["documents"],
        });

        let resp = self
            .authorize(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| HeraldError::ContextStore(format!("Query request failed: {e}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(HeraldError::ContextStore(format!(
                "Query failed: {} - {}",
                status, body
            )));
        }

        let parsed: QueryResponse = resp.json().await.map_err(|e| {
            HeraldError::ContextStore(format!("Failed to parse query response: {e}"))
        })?;
        Ok(first_result_documents(parsed))
    }
}

/// Documents for the first (and only) query embedding, nulls dropped
fn first_result_documents(resp: QueryResponse) -> Vec<String> {
    resp.documents
        .and_then(|per_query| per_query.into_iter().next())
        .map(|docs| docs.into_iter().flatten().collect())
        .unwrap_or_default()
}
