//! In-memory vector store implementation.
//!
//! Lives only as long as the process. Useful for testing and small datasets.

use super::{rank, IndexedEntry, SearchResult, VectorStore};
use crate::error::{RecipeRagError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory vector store.
pub struct MemoryVectorStore {
    collection: String,
    entries: RwLock<HashMap<String, IndexedEntry>>,
}

impl MemoryVectorStore {
    /// Create a new, empty in-memory collection.
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, IndexedEntry>>> {
        self.entries
            .read()
            .map_err(|e| RecipeRagError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, IndexedEntry>>> {
        self.entries
            .write()
            .map_err(|e| RecipeRagError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new("recipes")
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn upsert(&self, entry: &IndexedEntry) -> Result<()> {
        self.write()?.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    async fn upsert_batch(&self, entries: &[IndexedEntry]) -> Result<usize> {
        let mut store = self.write()?;
        for entry in entries {
            store.insert(entry.id.clone(), entry.clone());
        }
        Ok(entries.len())
    }

    async fn query(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let entries = self.read()?;
        rank(entries.values().cloned(), query_embedding, top_k)
    }

    async fn get(&self, id: &str) -> Result<Option<IndexedEntry>> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    async fn clear(&self) -> Result<usize> {
        let mut entries = self.write()?;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }

    async fn replace_all(&self, entries: &[IndexedEntry]) -> Result<usize> {
        let fresh: HashMap<String, IndexedEntry> = entries
            .iter()
            .map(|entry| (entry.id.clone(), entry.clone()))
            .collect();
        let stored = fresh.len();

        *self.write()? = fresh;
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::test_entry;

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new("recipes");
        assert_eq!(store.collection(), "recipes");

        store
            .upsert_batch(&[
                test_entry("0", "Tofu Stir Fry", vec![1.0, 0.0, 0.0]),
                test_entry("1", "Lentil Soup", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 2);

        let results = store.query(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].entry.metadata.name, "Tofu Stir Fry");
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = MemoryVectorStore::default();
        store.upsert(&test_entry("0", "Old", vec![1.0])).await.unwrap();
        store.upsert(&test_entry("0", "New", vec![1.0])).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let entry = store.get("0").await.unwrap().unwrap();
        assert_eq!(entry.metadata.name, "New");
    }

    #[tokio::test]
    async fn test_empty_query_and_clear() {
        let store = MemoryVectorStore::default();
        assert!(store.query(&[1.0, 0.0], 5).await.unwrap().is_empty());

        store.upsert(&test_entry("0", "Salad", vec![1.0, 0.0])).await.unwrap();
        assert_eq!(store.clear().await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_replace_all_swaps_contents() {
        let store = MemoryVectorStore::default();
        store
            .upsert_batch(&[
                test_entry("0", "Pasta", vec![1.0, 0.0]),
                test_entry("1", "Curry", vec![0.0, 1.0]),
                test_entry("2", "Stew", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let stored = store
            .replace_all(&[test_entry("0", "Porridge", vec![1.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(stored, 1);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get("0").await.unwrap().unwrap().metadata.name, "Porridge");
        assert!(store.get("2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_equal_scores_come_back_in_id_order() {
        let store = MemoryVectorStore::default();
        let entries: Vec<IndexedEntry> = ["3", "1", "4", "0", "2"]
            .iter()
            .map(|id| test_entry(id, "Same", vec![1.0, 0.0]))
            .collect();
        store.upsert_batch(&entries).await.unwrap();

        let ids: Vec<String> = store
            .query(&[1.0, 0.0], 5)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.entry.id)
            .collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    }
}
