//! Index command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the index command.
pub async fn run_index(data: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Index, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let path = data.map(|d| Settings::expand_path(&d));

    let spinner = Output::spinner("Embedding and indexing recipes...");
    let result = orchestrator.index_recipes(path.as_deref()).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            Output::success(&format!(
                "Indexed {} recipes into '{}' ({:.2}s)",
                report.entries_indexed, report.collection, report.elapsed_seconds
            ));
        }
        Err(e) => {
            Output::error(&format!("{}", e));
            let shown = path.unwrap_or_else(|| orchestrator.settings().recipes_path());
            Output::info(&format!("Dataset: {}", shown.display()));
            return Err(e.into());
        }
    }

    Ok(())
}
