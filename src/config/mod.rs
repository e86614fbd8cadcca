//! Configuration module for RecipeRAG.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AdvisorPrompts, Prompts};
pub use settings::{
    DataSettings, EmbeddingProvider, EmbeddingSettings, GeneralSettings, GenerationSettings,
    PromptSettings, RetrievalSettings, Settings, VectorStoreProvider, VectorStoreSettings,
};
