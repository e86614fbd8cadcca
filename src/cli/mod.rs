//! CLI module for RecipeRAG.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::rag::query::DEFAULT_HEALTH_CONDITION;
use crate::rag::Preferences;
use clap::{Args, Parser, Subcommand};

/// RecipeRAG - Personalized Nutrition Advisor
///
/// Get recipe suggestions tailored to your diet, health, and goals, grounded
/// in a local recipe dataset.
#[derive(Parser, Debug)]
#[command(name = "reciperag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "RECIPERAG_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Dietary preferences shared by the query commands.
#[derive(Args, Debug, Clone)]
pub struct PreferenceArgs {
    /// What meal are you looking for? (e.g. "quick dinner")
    pub query: String,

    /// Dietary restriction or allergy; repeat for several (e.g. -r Vegan -r Nut-Free)
    #[arg(short = 'r', long = "restriction")]
    pub restrictions: Vec<String>,

    /// Health condition (None, Diabetes, Heart Health, Weight Loss, Hypertension)
    #[arg(long = "health", default_value = DEFAULT_HEALTH_CONDITION)]
    pub health_condition: String,

    /// Nutritional goals (e.g. "high protein, low calories")
    #[arg(short = 'g', long = "goals", default_value = "")]
    pub nutritional_goals: String,

    /// Preferred cuisine (e.g. Indian, Mediterranean)
    #[arg(long)]
    pub cuisine: Option<String>,
}

impl From<PreferenceArgs> for Preferences {
    fn from(args: PreferenceArgs) -> Self {
        Self {
            query: args.query,
            restrictions: args.restrictions,
            health_condition: args.health_condition,
            nutritional_goals: args.nutritional_goals,
            cuisine: args.cuisine,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the recipe dataset and rebuild the vector index
    Index {
        /// Recipe JSON file (defaults to data.recipes_path)
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Get recipe suggestions for your preferences
    Suggest {
        #[command(flatten)]
        prefs: PreferenceArgs,

        /// LLM model to use for the recommendation
        #[arg(short, long)]
        model: Option<String>,

        /// Rebuild the index from the dataset before querying
        #[arg(long)]
        reindex: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the recipes that best match your preferences, without generation
    Search {
        #[command(flatten)]
        prefs: PreferenceArgs,

        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Show recipes from the dataset with their nutrition summary
    Recipes {
        /// Number of recipes to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
