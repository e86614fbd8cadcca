//! Retrieval and recommendation generation.

use super::query::{accuracy_score, Preferences};
use crate::config::Prompts;
use crate::embedding::Embedder;
use crate::error::{RecipeRagError, Result};
use crate::generation::TextGenerator;
use crate::vector_store::{EntryMetadata, SearchResult, VectorStore};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Context used when retrieval finds nothing.
pub const NO_RESULTS_CONTEXT: &str = "No relevant recipes found.";

/// Default number of recipes retrieved per query.
pub const DEFAULT_TOP_K: usize = 5;

/// The retrieval half of a query.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub augmented_query: String,
    pub results: Vec<SearchResult>,
    /// Retrieved documents joined by blank lines, or the placeholder.
    pub context: String,
    /// Time spent embedding the query and searching, in seconds.
    pub latency_seconds: f64,
}

impl Retrieval {
    pub fn metadatas(&self) -> Vec<EntryMetadata> {
        self.results.iter().map(|r| r.entry.metadata.clone()).collect()
    }
}

/// A generated recommendation with retrieval diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    /// Generated advice.
    pub text: String,
    /// Embedding plus retrieval time in seconds. Excludes generation.
    pub latency_seconds: f64,
    /// 1.0 if a restriction term appears in the retrieved recipes, else 0.5.
    pub accuracy: f64,
    /// Metadata of the retrieved recipes, best match first.
    pub metadatas: Vec<EntryMetadata>,
    pub augmented_query: String,
    pub context: String,
    /// Model that generated the advice.
    pub model: String,
}

/// Query engine: embeds the augmented query, retrieves recipes, and asks
/// the generator for a recommendation grounded in them.
pub struct QueryEngine {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
    prompts: Prompts,
    top_k: usize,
}

impl QueryEngine {
    /// Create a new query engine.
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            vector_store,
            embedder,
            generator,
            prompts: Prompts::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set the maximum number of retrieved recipes.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Embed the augmented query and fetch the nearest recipes.
    #[instrument(skip(self, prefs), fields(query = %prefs.query))]
    pub async fn retrieve(&self, prefs: &Preferences) -> Result<Retrieval> {
        let augmented_query = prefs.augmented_query();
        debug!("Augmented query: {}", augmented_query);

        let started = Instant::now();

        let query_embedding = self
            .embedder
            .embed(&augmented_query)
            .await
            .map_err(|e| RecipeRagError::Query(e.to_string()))?;

        let results = self
            .vector_store
            .query(&query_embedding, self.top_k)
            .await
            .map_err(|e| RecipeRagError::Query(e.to_string()))?;

        let latency_seconds = started.elapsed().as_secs_f64();

        let context = if results.is_empty() {
            NO_RESULTS_CONTEXT.to_string()
        } else {
            results
                .iter()
                .map(|r| r.entry.document.as_str())
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        info!("Retrieved {} recipes in {:.3}s", results.len(), latency_seconds);

        Ok(Retrieval {
            augmented_query,
            results,
            context,
            latency_seconds,
        })
    }

    /// Run the full pipeline: retrieve, generate, score.
    #[instrument(skip(self, prefs), fields(query = %prefs.query))]
    pub async fn recommend(&self, prefs: &Preferences) -> Result<Recommendation> {
        let retrieval = self.retrieve(prefs).await?;

        let system = self
            .prompts
            .render_with_custom(&self.prompts.advisor.system, &HashMap::new());
        let user = self
            .prompts
            .advisor_user(&retrieval.context, &retrieval.augmented_query);

        let text = self
            .generator
            .generate(&system, &user)
            .await
            .map_err(|e| RecipeRagError::Query(e.to_string()))?;

        let accuracy = accuracy_score(
            &prefs.restriction_tokens(),
            &retrieval.context,
            retrieval.results.len(),
        );

        Ok(Recommendation {
            text,
            latency_seconds: retrieval.latency_seconds,
            accuracy,
            metadatas: retrieval.metadatas(),
            augmented_query: retrieval.augmented_query,
            context: retrieval.context,
            model: self.generator.model().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{IndexedEntry, MemoryVectorStore};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Records the prompts it receives and replies with a canned answer.
    #[derive(Default)]
    struct RecordingGenerator {
        prompts: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, system: &str, user: &str) -> Result<String> {
            if self.fail {
                return Err(RecipeRagError::Generation("HTTP 503".to_string()));
            }
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok("Try the stir fry.".to_string())
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    /// Takes a while to answer, like a remote model.
    struct SlowGenerator;

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate(&self, _system: &str, _user: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_millis(250)).await;
            Ok("Eventually: soup.".to_string())
        }

        fn model(&self) -> &str {
            "slow"
        }
    }

    fn entry(id: &str, name: &str, embedding: Vec<f32>) -> IndexedEntry {
        IndexedEntry::new(
            id.to_string(),
            format!("Recipe: {}", name),
            embedding,
            EntryMetadata {
                name: name.to_string(),
                cuisine: "Asian".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_empty_collection_uses_placeholder() {
        let generator = Arc::new(RecordingGenerator::default());
        let engine = QueryEngine::new(
            Arc::new(MemoryVectorStore::default()),
            Arc::new(FixedEmbedder),
            generator.clone(),
        );

        let mut prefs = Preferences::new("quick dinner");
        prefs.restrictions = vec!["Vegan".to_string()];

        let rec = engine.recommend(&prefs).await.unwrap();
        assert_eq!(rec.context, NO_RESULTS_CONTEXT);
        assert!(rec.metadatas.is_empty());
        assert_eq!(rec.accuracy, 0.5);
        assert!(rec.latency_seconds >= 0.0);

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].0.starts_with("You are a nutrition expert."));
        assert!(prompts[0].1.starts_with("Context: No relevant recipes found.\nQuery: quick dinner -vegan for None."));
    }

    #[tokio::test]
    async fn test_context_joins_documents_best_first() {
        let store = Arc::new(MemoryVectorStore::default());
        store
            .upsert_batch(&[
                entry("0", "Vegan Chili", vec![1.0, 0.0]),
                entry("1", "Beef Stew", vec![0.2, 1.0]),
            ])
            .await
            .unwrap();

        let engine = QueryEngine::new(
            store,
            Arc::new(FixedEmbedder),
            Arc::new(RecordingGenerator::default()),
        );

        let mut prefs = Preferences::new("dinner");
        prefs.restrictions = vec!["Vegan".to_string()];

        let rec = engine.recommend(&prefs).await.unwrap();
        assert_eq!(rec.text, "Try the stir fry.");
        assert_eq!(rec.model, "canned");
        assert_eq!(rec.context, "Recipe: Vegan Chili\n\nRecipe: Beef Stew");
        assert_eq!(rec.metadatas[0].name, "Vegan Chili");
        assert_eq!(rec.accuracy, 1.0);
    }

    #[tokio::test]
    async fn test_top_k_limits_results() {
        let store = Arc::new(MemoryVectorStore::default());
        let entries: Vec<IndexedEntry> = (0..8)
            .map(|i| entry(&i.to_string(), &format!("Dish {}", i), vec![1.0, i as f32]))
            .collect();
        store.upsert_batch(&entries).await.unwrap();

        let engine = QueryEngine::new(
            store.clone(),
            Arc::new(FixedEmbedder),
            Arc::new(RecordingGenerator::default()),
        );
        let retrieval = engine.retrieve(&Preferences::new("dish")).await.unwrap();
        assert_eq!(retrieval.results.len(), DEFAULT_TOP_K);

        let engine = engine.with_top_k(2);
        let retrieval = engine.retrieve(&Preferences::new("dish")).await.unwrap();
        assert_eq!(retrieval.results.len(), 2);
    }

    #[tokio::test]
    async fn test_generation_failure_is_query_error() {
        let generator = Arc::new(RecordingGenerator {
            fail: true,
            ..Default::default()
        });
        let engine = QueryEngine::new(
            Arc::new(MemoryVectorStore::default()),
            Arc::new(FixedEmbedder),
            generator,
        );

        let result = engine.recommend(&Preferences::new("snack")).await;
        assert!(matches!(result, Err(RecipeRagError::Query(_))));
    }

    #[tokio::test]
    async fn test_latency_excludes_generation() {
        let store = Arc::new(MemoryVectorStore::default());
        store
            .upsert(&entry("0", "Miso Soup", vec![1.0, 0.0]))
            .await
            .unwrap();

        let engine = QueryEngine::new(store, Arc::new(FixedEmbedder), Arc::new(SlowGenerator));
        let started = std::time::Instant::now();
        let rec = engine.recommend(&Preferences::new("soup")).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(250));
        assert!(rec.latency_seconds < 0.2, "latency was {}", rec.latency_seconds);
        assert_eq!(rec.model, "slow");
    }

    #[tokio::test]
    async fn test_index_from_other_embedding_model_is_query_error() {
        let store = Arc::new(MemoryVectorStore::default());
        store
            .upsert(&entry("0", "Miso Soup", vec![1.0, 0.0, 0.0]))
            .await
            .unwrap();

        let engine = QueryEngine::new(
            store,
            Arc::new(FixedEmbedder),
            Arc::new(RecordingGenerator::default()),
        );

        let result = engine.retrieve(&Preferences::new("soup")).await;
        assert!(matches!(result, Err(RecipeRagError::Query(_))));
    }
}
