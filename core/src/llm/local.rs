//! Local all-MiniLM-L6-v2 embeddings (feature `local-embeddings`).
//!
//! Produces the same 384-dimensional vectors as Chroma's default embedding
//! function, so collections populated without an explicit embedding function
//! can be queried.

use super::embeddings::Embedder;
use crate::{HeraldError, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const MODEL_NAME: &str = "all-MiniLM-L6-v2";

pub struct MiniLmEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl MiniLmEmbedder {
    /// Load the model, downloading it on first use
    pub fn new() -> Result<Self> {
        let model = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
            .map_err(|e| HeraldError::Config(format!("Failed to load {MODEL_NAME}: {e}")))?;
        info!(target: "embeddings", model = MODEL_NAME, "Local embedding model loaded");
        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }
}

#[async_trait]
impl Embedder for MiniLmEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = self.model.clone();
        let input = text.to_string();
        debug!(target: "embeddings", model = MODEL_NAME, "Embedding query locally");

        // ONNX inference is CPU-bound
        let vectors = tokio::task::spawn_blocking(move || {
            #[allow(unused_mut)]
            let mut model = model
                .lock()
                .map_err(|_| HeraldError::ContextStore("Embedding model lock poisoned".into()))?;
            model
                .embed(vec![input], None)
                .map_err(|e| HeraldError::ContextStore(format!("Local embedding failed: {e}")))
        })
        .await
        .map_err(|e| HeraldError::ContextStore(format!("Embedding task failed: {e}")))??;

        vectors
            .into_iter()
            .next()
            .ok_or_else(|| HeraldError::ContextStore("Local embedding produced no vector".into()))
    }

    fn model_name(&self) -> String {
        MODEL_NAME.to_string()
    }
}
