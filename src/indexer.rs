//! Recipe indexing: embed each recipe's full text and store it in the
//! recipe collection under its positional id.

use crate::embedding::Embedder;
use crate::error::{RecipeRagError, Result};
use crate::recipe::RecipeRow;
use crate::vector_store::{EntryMetadata, IndexedEntry, VectorStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// Default number of recipes embedded per batch.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Embeds recipes and writes them to a vector store.
pub struct RecipeIndexer {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

/// Outcome of an indexing run.
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    /// Collection that was written.
    pub collection: String,
    /// Number of entries written.
    pub entries_indexed: usize,
    /// Wall-clock time spent embedding and storing.
    pub elapsed_seconds: f64,
}

impl RecipeIndexer {
    /// Create a new indexer.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set how many recipes are embedded per request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed and upsert every row. Existing entries with the same id are replaced.
    ///
    /// Every row is embedded before anything is written, so an embedding
    /// failure leaves the collection unchanged.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn ingest(&self, rows: &[RecipeRow]) -> Result<IndexReport> {
        let started = Instant::now();
        let entries = self.embed_rows(rows).await?;

        let indexed = self
            .vector_store
            .upsert_batch(&entries)
            .await
            .map_err(|e| RecipeRagError::Ingest(e.to_string()))?;

        Ok(self.report(indexed, started))
    }

    /// Embed every row, then swap the collection contents for the new entries.
    ///
    /// The previous index stays in place until the swap, and survives any
    /// failure before it.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn rebuild(&self, rows: &[RecipeRow]) -> Result<IndexReport> {
        let started = Instant::now();
        let entries = self.embed_rows(rows).await?;

        let indexed = self
            .vector_store
            .replace_all(&entries)
            .await
            .map_err(|e| RecipeRagError::Ingest(e.to_string()))?;

        Ok(self.report(indexed, started))
    }

    async fn embed_rows(&self, rows: &[RecipeRow]) -> Result<Vec<IndexedEntry>> {
        let mut entries = Vec::with_capacity(rows.len());

        for batch in rows.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|r| r.full_text.clone()).collect();
            let embeddings = self
                .embedder
                .embed_batch(&texts)
                .await
                .map_err(|e| RecipeRagError::Ingest(e.to_string()))?;

            if embeddings.len() != batch.len() {
                return Err(RecipeRagError::Ingest(format!(
                    "Embedder returned {} vectors for {} recipes",
                    embeddings.len(),
                    batch.len()
                )));
            }

            entries.extend(
                batch
                    .iter()
                    .zip(embeddings)
                    .map(|(row, embedding)| entry_for(row, embedding)),
            );
        }

        Ok(entries)
    }

    fn report(&self, indexed: usize, started: Instant) -> IndexReport {
        let report = IndexReport {
            collection: self.vector_store.collection().to_string(),
            entries_indexed: indexed,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        };

        info!(
            "Indexed {} recipes into '{}' in {:.2}s",
            report.entries_indexed, report.collection, report.elapsed_seconds
        );
        report
    }
}

fn entry_for(row: &RecipeRow, embedding: Vec<f32>) -> IndexedEntry {
    IndexedEntry::new(
        row.position.to_string(),
        row.full_text.clone(),
        embedding,
        EntryMetadata {
            name: row.name().to_string(),
            cuisine: row.cuisine().to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::parse_recipes;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as its length; enough to exercise indexing.
    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Embeds like `LengthEmbedder` until `fail_from` batches have been served.
    struct FlakyEmbedder {
        served: AtomicUsize,
        fail_from: usize,
    }

    impl FlakyEmbedder {
        fn failing_after(fail_from: usize) -> Self {
            Self {
                served: AtomicUsize::new(0),
                fail_from,
            }
        }
    }

    #[async_trait]
    impl Embedder for FlakyEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            LengthEmbedder.embed(text).await
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if self.served.fetch_add(1, Ordering::SeqCst) >= self.fail_from {
                return Err(RecipeRagError::Embedding("model unavailable".to_string()));
            }
            LengthEmbedder.embed_batch(texts).await
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn rows() -> Vec<RecipeRow> {
        parse_recipes(
            r#"[
                {"name": "Tofu Stir Fry", "cuisine": "Asian"},
                {"name": "Lentil Soup"},
                {"name": "Greek Salad", "cuisine": "Mediterranean"}
            ]"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_one_entry_per_row_with_positional_ids() {
        let store = Arc::new(MemoryVectorStore::new("recipes"));
        let indexer = RecipeIndexer::new(store.clone(), Arc::new(LengthEmbedder)).with_batch_size(2);

        let report = indexer.ingest(&rows()).await.unwrap();
        assert_eq!(report.entries_indexed, 3);
        assert_eq!(report.collection, "recipes");
        assert_eq!(store.count().await.unwrap(), 3);

        for (id, name) in [("0", "Tofu Stir Fry"), ("1", "Lentil Soup"), ("2", "Greek Salad")] {
            let entry = store.get(id).await.unwrap().unwrap();
            assert_eq!(entry.metadata.name, name);
            assert!(entry.document.starts_with(&format!("Recipe: {}", name)));
        }
        assert_eq!(store.get("1").await.unwrap().unwrap().metadata.cuisine, "General");
    }

    #[tokio::test]
    async fn test_reingest_overwrites() {
        let store = Arc::new(MemoryVectorStore::new("recipes"));
        let indexer = RecipeIndexer::new(store.clone(), Arc::new(LengthEmbedder));

        indexer.ingest(&rows()).await.unwrap();
        indexer.ingest(&rows()).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 3);

        // Rebuilding from a shorter dataset drops the stale tail.
        let shorter = parse_recipes(r#"[{"name": "Porridge"}]"#).unwrap();
        indexer.rebuild(&shorter).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get("0").await.unwrap().unwrap().metadata.name, "Porridge");
    }

    #[tokio::test]
    async fn test_empty_dataset() {
        let store = Arc::new(MemoryVectorStore::new("recipes"));
        let indexer = RecipeIndexer::new(store.clone(), Arc::new(LengthEmbedder));

        let report = indexer.ingest(&[]).await.unwrap();
        assert_eq!(report.entries_indexed, 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_ingest_error() {
        let store = Arc::new(MemoryVectorStore::new("recipes"));
        // The second batch fails; nothing from the first may be written.
        let indexer = RecipeIndexer::new(store.clone(), Arc::new(FlakyEmbedder::failing_after(1)))
            .with_batch_size(2);

        let result = indexer.ingest(&rows()).await;
        assert!(matches!(result, Err(RecipeRagError::Ingest(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_index() {
        let store = Arc::new(MemoryVectorStore::new("recipes"));
        RecipeIndexer::new(store.clone(), Arc::new(LengthEmbedder))
            .rebuild(&rows())
            .await
            .unwrap();

        let shorter = parse_recipes(r#"[{"name": "Porridge"}]"#).unwrap();
        let failing = RecipeIndexer::new(store.clone(), Arc::new(FlakyEmbedder::failing_after(0)));
        let result = failing.rebuild(&shorter).await;

        assert!(matches!(result, Err(RecipeRagError::Ingest(_))));
        assert_eq!(store.count().await.unwrap(), 3);
        assert_eq!(store.get("0").await.unwrap().unwrap().metadata.name, "Tofu Stir Fry");
    }
}
