//! Recipes command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::recipe::load_data;
use anyhow::Result;

/// Run the recipes command.
pub fn run_recipes(limit: usize, settings: &Settings) -> Result<()> {
    let path = settings.recipes_path();

    match load_data(&path) {
        Ok(rows) => {
            Output::header(&format!("Sample Recipes ({} of {})", rows.len().min(limit), rows.len()));
            println!();

            for row in rows.iter().take(limit) {
                Output::recipe_info(row.name(), row.cuisine(), &row.nutrition_str);
            }
        }
        Err(e) => {
            Output::error(&format!("Error loading data: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
