//! In-process embeddings from a pretrained static sentence-embedding model.

use super::Embedder;
use crate::error::{RecipeRagError, Result};
use async_trait::async_trait;
use model2vec_rs::model::StaticModel;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Embedder backed by a model2vec static model.
///
/// The model is downloaded from the Hugging Face hub (or read from a local
/// directory) once, when the embedder is created.
pub struct LocalEmbedder {
    model: Arc<StaticModel>,
    model_id: String,
    dimensions: usize,
}

impl LocalEmbedder {
    /// Load a pretrained model by repo id or local path.
    #[instrument]
    pub fn from_pretrained(model_id: &str, dimensions: usize) -> Result<Self> {
        info!("Loading embedding model {}", model_id);
        let model = StaticModel::from_pretrained(model_id, None, None, None).map_err(|e| {
            RecipeRagError::Embedding(format!("Failed to load model {}: {}", model_id, e))
        })?;

        Ok(Self {
            model: Arc::new(model),
            model_id: model_id.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RecipeRagError::Embedding("Model returned no embedding".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Encoding is CPU-bound; keep it off the async workers.
        let model = self.model.clone();
        let texts = texts.to_vec();
        let embeddings = tokio::task::spawn_blocking(move || model.encode(&texts))
            .await
            .map_err(|e| RecipeRagError::Embedding(format!("Embedding task failed: {}", e)))?;

        if let Some(first) = embeddings.first() {
            if first.len() != self.dimensions {
                debug!(
                    "Model {} produced {} dimensions, configured {}",
                    self.model_id,
                    first.len(),
                    self.dimensions
                );
            }
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
