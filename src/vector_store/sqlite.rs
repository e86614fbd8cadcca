//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity. Recipe
//! datasets are small enough that a full scan per query is fine.

use super::{rank, EntryMetadata, IndexedEntry, SearchResult, VectorStore};
use crate::error::{RecipeRagError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    document TEXT NOT NULL,
    embedding BLOB NOT NULL,
    name TEXT NOT NULL,
    cuisine TEXT NOT NULL,
    indexed_at TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);
"#;

const UPSERT_SQL: &str = r#"
INSERT OR REPLACE INTO entries
(collection, id, document, embedding, name, cuisine, indexed_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

const SELECT_COLUMNS: &str = "id, document, embedding, name, cuisine, indexed_at";

/// SQLite-based vector store bound to one collection.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
    collection: String,
}

impl SqliteVectorStore {
    /// Open (or create) a database file and the named collection in it.
    #[instrument(skip_all, fields(collection = %collection))]
    pub fn new(path: &Path, collection: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self::init(conn, collection)?;
        info!("Opened SQLite vector store at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory(collection: &str) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, collection)
    }

    fn init(conn: Connection, collection: &str) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RecipeRagError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<IndexedEntry> {
        let embedding_bytes: Vec<u8> = row.get(2)?;
        let indexed_at_str: String = row.get(5)?;

        Ok(IndexedEntry {
            id: row.get(0)?,
            document: row.get(1)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            metadata: EntryMetadata {
                name: row.get(3)?,
                cuisine: row.get(4)?,
            },
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    fn insert_all(
        tx: &rusqlite::Transaction<'_>,
        collection: &str,
        entries: &[IndexedEntry],
    ) -> Result<()> {
        let mut stmt = tx.prepare(UPSERT_SQL)?;
        for entry in entries {
            stmt.execute(params![
                collection,
                entry.id,
                entry.document,
                Self::embedding_to_bytes(&entry.embedding),
                entry.metadata.name,
                entry.metadata.cuisine,
                entry.indexed_at.to_rfc3339(),
            ])?;
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    #[instrument(skip(self, entry), fields(id = %entry.id))]
    async fn upsert(&self, entry: &IndexedEntry) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            UPSERT_SQL,
            params![
                self.collection,
                entry.id,
                entry.document,
                Self::embedding_to_bytes(&entry.embedding),
                entry.metadata.name,
                entry.metadata.cuisine,
                entry.indexed_at.to_rfc3339(),
            ],
        )?;

        debug!("Upserted entry {}", entry.id);
        Ok(())
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn upsert_batch(&self, entries: &[IndexedEntry]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        Self::insert_all(&tx, &self.collection, entries)?;
        tx.commit()?;
        info!("Batch upserted {} entries into {}", entries.len(), self.collection);
        Ok(entries.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn query(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM entries WHERE collection = ?1",
            SELECT_COLUMNS
        ))?;

        let entries = stmt
            .query_map(params![self.collection], Self::row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let results = rank(entries, query_embedding, top_k)?;
        debug!("Found {} matching entries", results.len());
        Ok(results)
    }

    async fn get(&self, id: &str) -> Result<Option<IndexedEntry>> {
        let conn = self.lock()?;

        let entry = conn
            .query_row(
                &format!(
                    "SELECT {} FROM entries WHERE collection = ?1 AND id = ?2",
                    SELECT_COLUMNS
                ),
                params![self.collection, id],
                Self::row_to_entry,
            )
            .optional()?;

        Ok(entry)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE collection = ?1",
            params![self.collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM entries WHERE collection = ?1",
            params![self.collection],
        )?;

        info!("Cleared {} entries from {}", deleted, self.collection);
        Ok(deleted)
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn replace_all(&self, entries: &[IndexedEntry]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let removed = tx.execute(
            "DELETE FROM entries WHERE collection = ?1",
            params![self.collection],
        )?;
        Self::insert_all(&tx, &self.collection, entries)?;
        tx.commit()?;

        info!(
            "Replaced {} entries in {} with {}",
            removed,
            self.collection,
            entries.len()
        );
        Ok(entries.len())
    }
}
