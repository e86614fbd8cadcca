//! Pipeline orchestrator for RecipeRAG.
//!
//! Builds the configured backends once and coordinates loading, indexing and
//! querying. The collection is reused across queries and only rebuilt when a
//! caller asks for it.

use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::Result;
use crate::generation::{OpenAIGenerator, TextGenerator};
use crate::indexer::{IndexReport, RecipeIndexer};
use crate::rag::{Preferences, QueryEngine, Recommendation, Retrieval};
use crate::recipe::{load_data, RecipeRow};
use crate::vector_store::{create_vector_store, VectorStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the RecipeRAG pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    generator: Arc<dyn TextGenerator>,
}

impl Orchestrator {
    /// Create an orchestrator with backends chosen by the settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_file.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        info!(
            "Using {} embeddings ({}) and {} for generation",
            settings.embedding.provider, settings.embedding.model, settings.generation.model
        );

        let embedder = create_embedder(&settings.embedding)?;
        let vector_store = create_vector_store(&settings)?;
        let generator: Arc<dyn TextGenerator> = Arc::new(OpenAIGenerator::new(&settings.generation)?);

        Ok(Self {
            settings,
            prompts,
            embedder,
            vector_store,
            generator,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            settings,
            prompts,
            embedder,
            vector_store,
            generator,
        }
    }

    /// Replace the generator, e.g. to use a different model for one request.
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Load the dataset, from `path` or the configured location.
    pub fn load_recipes(&self, path: Option<&Path>) -> Result<Vec<RecipeRow>> {
        match path {
            Some(p) => load_data(p),
            None => load_data(&self.settings.recipes_path()),
        }
    }

    /// Load the dataset and rebuild the collection from it.
    #[instrument(skip(self))]
    pub async fn index_recipes(&self, path: Option<&Path>) -> Result<IndexReport> {
        let rows = self.load_recipes(path)?;
        self.indexer().rebuild(&rows).await
    }

    /// Number of entries currently indexed.
    pub async fn indexed_count(&self) -> Result<usize> {
        self.vector_store.count().await
    }

    /// Retrieve recipes for the preferences without generating advice.
    pub async fn search(&self, prefs: &Preferences, top_k: Option<usize>) -> Result<Retrieval> {
        let mut engine = self.query_engine();
        if let Some(k) = top_k {
            engine = engine.with_top_k(k);
        }
        engine.retrieve(prefs).await
    }

    /// Generate a recommendation for the preferences.
    #[instrument(skip(self, prefs), fields(query = %prefs.query))]
    pub async fn suggest(&self, prefs: &Preferences) -> Result<Recommendation> {
        if let Ok(0) = self.vector_store.count().await {
            warn!(
                "Collection '{}' is empty; run `reciperag index` to build it",
                self.vector_store.collection()
            );
        }

        self.query_engine().recommend(prefs).await
    }

    fn indexer(&self) -> RecipeIndexer {
        RecipeIndexer::new(self.vector_store.clone(), self.embedder.clone())
            .with_batch_size(self.settings.embedding.batch_size)
    }

    fn query_engine(&self) -> QueryEngine {
        QueryEngine::new(
            self.vector_store.clone(),
            self.embedder.clone(),
            self.generator.clone(),
        )
        .with_prompts(self.prompts.clone())
        .with_top_k(self.settings.retrieval.top_k)
    }
}
