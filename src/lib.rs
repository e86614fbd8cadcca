//! RecipeRAG - Personalized Nutrition Advisor
//!
//! Suggests recipes for a user's dietary restrictions, health condition and
//! nutritional goals, grounded in a local recipe dataset through similarity
//! search.
//!
//! # Architecture
//!
//! - `recipe` - Loading the JSON dataset and deriving searchable text
//! - `embedding` - Embedding generation (local static model or OpenAI)
//! - `vector_store` - Named recipe collection (SQLite or in-memory)
//! - `indexer` - Embedding recipes into the collection
//! - `generation` - Prompt-to-completion backends
//! - `rag` - Augmented queries, retrieval and recommendations
//! - `orchestrator` - Wiring the configured backends together
//!
//! # Example
//!
//! ```rust,no_run
//! use reciperag::config::Settings;
//! use reciperag::orchestrator::Orchestrator;
//! use reciperag::rag::Preferences;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let orchestrator = Orchestrator::new(Settings::load()?)?;
//!     orchestrator.index_recipes(None).await?;
//!
//!     let mut prefs = Preferences::new("quick dinner");
//!     prefs.restrictions = vec!["Vegan".to_string()];
//!     let recommendation = orchestrator.suggest(&prefs).await?;
//!     println!("{}", recommendation.text);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod indexer;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod recipe;
pub mod vector_store;

pub use error::{RecipeRagError, Result};
