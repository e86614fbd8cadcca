//! Text generation backends.
//!
//! The advisor sends one system prompt and one user prompt and gets one
//! completion string back.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for prompt-to-completion generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a system and user message pair.
    async fn generate(&self, system: &str, user: &str) -> Result<String>;

    /// Model identifier used for generation.
    fn model(&self) -> &str;
}
