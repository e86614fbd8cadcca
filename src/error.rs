//! Error types for RecipeRAG.

use thiserror::Error;

/// Library-level error type for RecipeRAG operations.
///
/// `Load`, `Ingest` and `Query` are the pipeline-stage errors callers see.
/// The remaining variants come from backends and are wrapped into the stage
/// that was running when they occurred.
#[derive(Error, Debug)]
pub enum RecipeRagError {
    #[error("Failed to load recipes: {0}")]
    Load(String),

    #[error("Failed to index recipes: {0}")]
    Ingest(String),

    #[error("Recipe query failed: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for RecipeRAG operations.
pub type Result<T> = std::result::Result<T, RecipeRagError>;
