//! RecipeRAG CLI entry point.

use anyhow::Result;
use clap::Parser;
use reciperag::cli::{commands, Cli, Commands};
use reciperag::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("reciperag={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match cli.command {
        Commands::Index { data } => {
            commands::run_index(data, settings).await?;
        }

        Commands::Suggest {
            prefs,
            model,
            reindex,
            json,
        } => {
            commands::run_suggest(prefs, model, reindex, json, settings).await?;
        }

        Commands::Search { prefs, top_k } => {
            commands::run_search(prefs, top_k, settings).await?;
        }

        Commands::Recipes { limit } => {
            commands::run_recipes(limit, &settings)?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, &settings)?;
        }
    }

    Ok(())
}
