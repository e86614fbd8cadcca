//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, PreferenceArgs};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::Preferences;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(prefs: PreferenceArgs, top_k: Option<usize>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let prefs = Preferences::from(prefs);

    let spinner = Output::spinner("Searching...");
    let results = orchestrator.search(&prefs, top_k).await;
    spinner.finish_and_clear();

    match results {
        Ok(retrieval) => {
            Output::kv("Query", &retrieval.augmented_query);
            if retrieval.results.is_empty() {
                Output::warning("No recipes found. Has the index been built?");
            } else {
                Output::success(&format!(
                    "Found {} recipes in {:.3}s",
                    retrieval.results.len(),
                    retrieval.latency_seconds
                ));

                for result in &retrieval.results {
                    Output::search_result(
                        &result.entry.metadata.name,
                        &result.entry.metadata.cuisine,
                        result.score,
                        &result.entry.document,
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
