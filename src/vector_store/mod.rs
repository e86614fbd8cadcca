//! Vector store abstraction for RecipeRAG.
//!
//! Provides a trait-based interface over a named collection of embedded
//! recipes, with SQLite and in-memory backends.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::config::{Settings, VectorStoreProvider};
use crate::error::{RecipeRagError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Metadata stored alongside each indexed recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub name: String,
    pub cuisine: String,
}

/// An embedded recipe stored in a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedEntry {
    /// Entry id, unique within the collection.
    pub id: String,
    /// Text that was embedded.
    pub document: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    pub metadata: EntryMetadata,
    /// When this entry was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl IndexedEntry {
    /// Create a new entry.
    pub fn new(id: String, document: String, embedding: Vec<f32>, metadata: EntryMetadata) -> Self {
        Self {
            id,
            document,
            embedding,
            metadata,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched entry.
    pub entry: IndexedEntry,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
///
/// Every store is bound to one collection; ids are unique within it and
/// upserting an existing id replaces the entry.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Name of the collection this store reads and writes.
    fn collection(&self) -> &str;

    /// Store an entry, replacing any entry with the same id.
    async fn upsert(&self, entry: &IndexedEntry) -> Result<()>;

    /// Bulk upsert entries. Either all entries are stored or none.
    async fn upsert_batch(&self, entries: &[IndexedEntry]) -> Result<usize>;

    /// Return up to `top_k` entries ranked by similarity to the query embedding.
    ///
    /// An empty or missing collection yields an empty result.
    async fn query(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Get an entry by id.
    async fn get(&self, id: &str) -> Result<Option<IndexedEntry>>;

    /// Number of entries in the collection.
    async fn count(&self) -> Result<usize>;

    /// Remove all entries from the collection. Returns the number removed.
    async fn clear(&self) -> Result<usize>;

    /// Replace the whole collection with `entries` in one step.
    ///
    /// Readers see either the old contents or the new ones. On failure the
    /// old contents are kept.
    async fn replace_all(&self, entries: &[IndexedEntry]) -> Result<usize>;
}

/// Build the vector store selected in settings.
pub fn create_vector_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    let collection = &settings.vector_store.collection;
    let store: Arc<dyn VectorStore> = match settings.vector_store.provider {
        VectorStoreProvider::Sqlite => {
            Arc::new(SqliteVectorStore::new(&settings.sqlite_path(), collection)?)
        }
        VectorStoreProvider::Memory => Arc::new(MemoryVectorStore::new(collection)),
    };
    Ok(store)
}

/// Rank entries by cosine similarity and keep the best `top_k`.
///
/// Equal scores are ordered by id. An entry whose embedding length differs
/// from the query's was produced by another model and is an error.
pub(crate) fn rank(
    entries: impl IntoIterator<Item = IndexedEntry>,
    query_embedding: &[f32],
    top_k: usize,
) -> Result<Vec<SearchResult>> {
    let mut results = Vec::new();
    for entry in entries {
        if entry.embedding.len() != query_embedding.len() {
            return Err(RecipeRagError::VectorStore(format!(
                "Embedding dimension mismatch: query has {}, entry {} has {}. Rebuild the index after changing the embedding model",
                query_embedding.len(),
                entry.id,
                entry.embedding.len()
            )));
        }
        let score = cosine_similarity(query_embedding, &entry.embedding);
        results.push(SearchResult { entry, score });
    }

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.entry.id.cmp(&b.entry.id))
    });
    results.truncate(top_k);
    Ok(results)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
pub(crate) fn test_entry(id: &str, name: &str, embedding: Vec<f32>) -> IndexedEntry {
    IndexedEntry::new(
        id.to_string(),
        format!("Recipe: {}", name),
        embedding,
        EntryMetadata {
            name: name.to_string(),
            cuisine: "General".to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        // Mismatched dimensions never match.
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let entries = vec![
            test_entry("0", "far", vec![0.0, 1.0]),
            test_entry("1", "near", vec![1.0, 0.1]),
            test_entry("2", "middle", vec![1.0, 1.0]),
        ];

        let results = rank(entries, &[1.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entry.metadata.name, "near");
        assert_eq!(results[1].entry.metadata.name, "middle");
    }

    #[test]
    fn test_rank_breaks_ties_by_id() {
        let entries = vec![
            test_entry("2", "c", vec![1.0, 0.0]),
            test_entry("0", "a", vec![1.0, 0.0]),
            test_entry("1", "b", vec![2.0, 0.0]),
        ];

        let ids: Vec<String> = rank(entries, &[1.0, 0.0], 3)
            .unwrap()
            .into_iter()
            .map(|r| r.entry.id)
            .collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_rank_rejects_dimension_mismatch() {
        let entries = vec![test_entry("0", "Soup", vec![1.0, 0.0, 0.0])];

        let result = rank(entries, &[1.0, 0.0], 5);
        assert!(matches!(result, Err(RecipeRagError::VectorStore(_))));
    }
}
