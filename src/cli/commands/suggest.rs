//! Suggest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, PreferenceArgs};
use crate::config::Settings;
use crate::generation::OpenAIGenerator;
use crate::orchestrator::Orchestrator;
use crate::rag::{Preferences, Recommendation};
use anyhow::Result;
use std::sync::Arc;

/// Run the suggest command.
pub async fn run_suggest(
    prefs: PreferenceArgs,
    model: Option<String>,
    reindex: bool,
    json: bool,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Suggest, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let mut orchestrator = Orchestrator::new(settings.clone())?;
    if let Some(model) = model {
        let generator = OpenAIGenerator::new(&settings.generation)?.with_model(&model);
        orchestrator = orchestrator.with_generator(Arc::new(generator));
    }

    if reindex {
        let spinner = Output::spinner("Rebuilding recipe index...");
        let report = orchestrator.index_recipes(None).await;
        spinner.finish_and_clear();

        match report {
            Ok(report) => Output::info(&format!("Indexed {} recipes", report.entries_indexed)),
            Err(e) => {
                Output::error(&format!("Failed to rebuild the index: {}", e));
                return Err(e.into());
            }
        }
    }

    let prefs = Preferences::from(prefs);
    let spinner = Output::spinner("Finding recipes...");
    let result = orchestrator.suggest(&prefs).await;
    spinner.finish_and_clear();

    match result {
        Ok(recommendation) if json => {
            println!("{}", serde_json::to_string_pretty(&recommendation)?);
        }
        Ok(recommendation) => print_recommendation(&recommendation),
        Err(e) => {
            Output::error(&format!("Error processing request: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

fn print_recommendation(rec: &Recommendation) {
    Output::header("Recommendations");
    println!("\n{}\n", rec.text);

    if rec.metadatas.is_empty() {
        Output::warning("No matching recipes in the index. Run 'reciperag index' first.");
    } else {
        Output::header("Retrieved recipes");
        for meta in &rec.metadatas {
            Output::kv(&meta.name, &meta.cuisine);
        }
    }

    println!();
    Output::kv("Model", &rec.model);
    Output::kv("Retrieval latency", &format!("{:.2} seconds", rec.latency_seconds));
    Output::kv(
        "Basic accuracy",
        &format!("{}% (term match in retrieved docs)", rec.accuracy * 100.0),
    );
}
