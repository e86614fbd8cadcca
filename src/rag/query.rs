//! User preferences and the augmented query built from them.

use serde::{Deserialize, Serialize};

/// Health condition used when none is selected.
pub const DEFAULT_HEALTH_CONDITION: &str = "None";

/// Dietary preferences collected from the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Free-text meal request (e.g. "quick dinner").
    pub query: String,
    /// Selected dietary restrictions or allergies (e.g. "Vegan", "Nut-Free").
    pub restrictions: Vec<String>,
    /// Health condition (e.g. "Diabetes").
    pub health_condition: String,
    /// Free-text nutritional goals (e.g. "high protein").
    pub nutritional_goals: String,
    /// Preferred cuisine, if any.
    pub cuisine: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            query: String::new(),
            restrictions: Vec::new(),
            health_condition: DEFAULT_HEALTH_CONDITION.to_string(),
            nutritional_goals: String::new(),
            cuisine: None,
        }
    }
}

impl Preferences {
    /// Create preferences for a query with everything else defaulted.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Restrictions rendered as "-vegan -gluten-free".
    pub fn restriction_tokens(&self) -> String {
        restriction_tokens(&self.restrictions)
    }

    /// Build the string that gets embedded for retrieval.
    pub fn augmented_query(&self) -> String {
        let mut augmented = format!(
            "{} {} for {}. Optimize for {}.",
            self.query,
            self.restriction_tokens(),
            self.health_condition,
            self.nutritional_goals
        );

        if let Some(cuisine) = self.cuisine.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            augmented.push_str(&format!(" Preferred cuisine: {}.", cuisine));
        }

        augmented
    }
}

/// Render restrictions as lowercased, hyphen-prefixed tokens joined by spaces.
pub fn restriction_tokens(restrictions: &[String]) -> String {
    restrictions
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(|r| format!("-{}", r.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Score how well retrieved context honours the restrictions.
///
/// 1.0 when any restriction token (leading '-' removed) occurs in the
/// lowercased context of a non-empty retrieval, 0.5 otherwise. A coarse
/// indicator, not a calibrated metric.
pub fn accuracy_score(restriction_tokens: &str, context: &str, retrieved: usize) -> f64 {
    if retrieved == 0 {
        return 0.5;
    }

    let context = context.to_lowercase();
    let matched = restriction_tokens
        .to_lowercase()
        .split_whitespace()
        .map(|token| token.trim_start_matches('-'))
        .filter(|term| !term.is_empty())
        .any(|term| context.contains(term));

    if matched {
        1.0
    } else {
        0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_augmented_query_template() {
        let prefs = Preferences {
            query: "quick dinner".to_string(),
            restrictions: vec!["Vegan".to_string(), "Gluten-Free".to_string()],
            health_condition: "Diabetes".to_string(),
            nutritional_goals: "high protein".to_string(),
            cuisine: None,
        };

        assert_eq!(prefs.restriction_tokens(), "-vegan -gluten-free");
        assert_eq!(
            prefs.augmented_query(),
            "quick dinner -vegan -gluten-free for Diabetes. Optimize for high protein."
        );
    }

    #[test]
    fn test_augmented_query_defaults_and_cuisine() {
        let mut prefs = Preferences::new("lunch");
        assert_eq!(prefs.augmented_query(), "lunch  for None. Optimize for .");

        prefs.cuisine = Some("  ".to_string());
        assert_eq!(prefs.augmented_query(), "lunch  for None. Optimize for .");

        prefs.cuisine = Some("Indian".to_string());
        assert_eq!(
            prefs.augmented_query(),
            "lunch  for None. Optimize for . Preferred cuisine: Indian."
        );
    }

    #[test]
    fn test_accuracy_matches_without_hyphen() {
        let context = "Recipe: Vegan Chili\nIngredients: beans";
        assert_eq!(accuracy_score("-vegan", context, 1), 1.0);
        assert_eq!(accuracy_score("-nut-free -vegan", context, 1), 1.0);
        assert_eq!(accuracy_score("-gluten-free", context, 1), 0.5);
    }

    #[test]
    fn test_accuracy_fallbacks() {
        // No restrictions selected.
        assert_eq!(accuracy_score("", "vegan", 1), 0.5);
        // Nothing retrieved, even if the placeholder happened to match.
        assert_eq!(accuracy_score("-recipes", "No relevant recipes found.", 0), 0.5);
    }
}
