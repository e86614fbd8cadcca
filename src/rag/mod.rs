//! RAG (Retrieval-Augmented Generation) for recipe recommendations.
//!
//! Turns user preferences into an augmented query, retrieves the closest
//! recipes, and asks a language model for advice grounded in them.

mod engine;
pub mod query;

pub use engine::{QueryEngine, Recommendation, Retrieval, DEFAULT_TOP_K, NO_RESULTS_CONTEXT};
pub use query::{accuracy_score, restriction_tokens, Preferences};
