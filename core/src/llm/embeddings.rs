use crate::{HeraldError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use super::client::LlmClient;

/// Turns query text into a vector for similarity search
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Model identifier, reported when vectors do not fit a collection
    fn model_name(&self) -> String;
}

/// Which embedder produces query vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// OpenAI-compatible `/embeddings` endpoint of the configured provider
    OpenAi,
    /// Local all-MiniLM-L6-v2, Chroma's default embedding function
    MiniLm,
}

impl Default for EmbedderKind {
    fn default() -> Self {
        if cfg!(feature = "local-embeddings") {
            EmbedderKind::MiniLm
        } else {
            EmbedderKind::OpenAi
        }
    }
}

impl FromStr for EmbedderKind {
    type Err = HeraldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(EmbedderKind::OpenAi),
            "minilm" | "default" | "local" => Ok(EmbedderKind::MiniLm),
            other => Err(HeraldError::Config(format!("Unknown embedder: {other}"))),
        }
    }
}

/// Build the embedder selected by `kind`
pub fn embedder_for(kind: EmbedderKind, llm: Arc<LlmClient>) -> Result<Arc<dyn Embedder>> {
    match kind {
        EmbedderKind::OpenAi => Ok(llm),
        #[cfg(feature = "local-embeddings")]
        EmbedderKind::MiniLm => Ok(Arc::new(super::local::MiniLmEmbedder::new()?)),
        #[cfg(not(feature = "local-embeddings"))]
        EmbedderKind::MiniLm => Err(HeraldError::Config(
            "The minilm embedder requires building herald-core with the local-embeddings feature"
                .into(),
        )),
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for LlmClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = self.endpoint("embeddings");
        debug!(target: "llm_client", model = %self.cfg.embedding_model, "POST {} via Embeddings", url);

        let body = json!({
            "model": self.cfg.embedding_model,
            "input": text,
        });
        let resp = self
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HeraldError::Llm(format!("Embeddings HTTP error: {e}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(HeraldError::Llm(format!(
                "Embeddings error: status={} body={}",
                status, text
            )));
        }

        let parsed: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| HeraldError::Llm(format!("Failed to parse Embeddings JSON: {e}")))?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| HeraldError::Llm("Embeddings response contained no vectors".into()))
    }

    fn model_name(&self) -> String {
        self.cfg.embedding_model.clone()
    }
}
