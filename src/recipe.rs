//! Recipe dataset loading.
//!
//! Parses a JSON array of recipe objects and derives the nutrition summary and
//! the full-text representation that gets embedded.

use crate::error::{RecipeRagError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Nutrition facts for a recipe. Missing values count as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Nutrition {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

impl Nutrition {
    /// Format as "Calories: 300kcal, Protein: 20g, Carbs: 10g, Fat: 12g".
    pub fn summary(&self) -> String {
        format!(
            "Calories: {}kcal, Protein: {}g, Carbs: {}g, Fat: {}g",
            self.calories.unwrap_or(0.0),
            self.protein.unwrap_or(0.0),
            self.carbs.unwrap_or(0.0),
            self.fat.unwrap_or(0.0),
        )
    }
}

/// A recipe record as found in the source JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Recipe {
    pub name: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<String>,
    pub cuisine: Option<String>,
    pub nutrition: Option<Nutrition>,
}

impl Recipe {
    /// Recipe name, or "Unknown".
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    /// Cuisine, or "General".
    pub fn display_cuisine(&self) -> &str {
        self.cuisine.as_deref().unwrap_or("General")
    }

    /// Instructions, or "N/A".
    pub fn display_instructions(&self) -> &str {
        self.instructions.as_deref().unwrap_or("N/A")
    }

    pub fn ingredients(&self) -> &[String] {
        self.ingredients.as_deref().unwrap_or_default()
    }
}

/// A loaded recipe with its derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeRow {
    /// Position of the recipe in the source array.
    pub position: usize,
    pub recipe: Recipe,
    pub nutrition_str: String,
    pub full_text: String,
}

impl RecipeRow {
    /// Derive the summary fields for a recipe.
    pub fn new(position: usize, recipe: Recipe) -> Self {
        let nutrition_str = recipe.nutrition.clone().unwrap_or_default().summary();
        let full_text = format!(
            "Recipe: {}\nIngredients: {}\nInstructions: {}\nNutrition: {}\nCuisine: {}",
            recipe.display_name(),
            recipe.ingredients().join(", "),
            recipe.display_instructions(),
            nutrition_str,
            recipe.display_cuisine(),
        );

        Self {
            position,
            recipe,
            nutrition_str,
            full_text,
        }
    }

    pub fn name(&self) -> &str {
        self.recipe.display_name()
    }

    pub fn cuisine(&self) -> &str {
        self.recipe.display_cuisine()
    }
}

/// Load recipes from a JSON file.
#[instrument]
pub fn load_data(path: &Path) -> Result<Vec<RecipeRow>> {
    if !path.exists() {
        return Err(RecipeRagError::Load(format!(
            "Recipe file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        RecipeRagError::Load(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let rows = parse_recipes(&content)
        .map_err(|e| RecipeRagError::Load(format!("{}: {}", path.display(), e)))?;

    debug!("Loaded {} recipes from {:?}", rows.len(), path);
    Ok(rows)
}

/// Parse recipes from a JSON string holding an array of objects.
pub fn parse_recipes(json: &str) -> Result<Vec<RecipeRow>> {
    let recipes: Vec<Recipe> = serde_json::from_str(json)
        .map_err(|e| RecipeRagError::Load(format!("Invalid recipe JSON: {}", e)))?;

    Ok(recipes
        .into_iter()
        .enumerate()
        .map(|(i, recipe)| RecipeRow::new(i, recipe))
        .collect())
}
