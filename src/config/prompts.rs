//! Prompt templates for RecipeRAG.
//!
//! The advisor prompts can be replaced by pointing `prompts.custom_file` at a
//! TOML file with `system` and `user` keys.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub advisor: AdvisorPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the nutrition advisor generation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorPrompts {
    pub system: String,
    pub user: String,
}

impl Default for AdvisorPrompts {
    fn default() -> Self {
        Self {
            system: "You are a nutrition expert. Suggest recipes, substitutions, and track goals based on context."
                .to_string(),
            user: "Context: {{context}}\nQuery: {{query}}\nProvide: 1. Recommended recipes. 2. Substitutions for restrictions/allergies. 3. Nutritional analysis. 4. Why it matches health condition."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, with an optional override file and custom variables.
    pub fn load(
        custom_file: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(file) = custom_file {
            let path = PathBuf::from(shellexpand::tilde(file).to_string());
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                prompts.advisor = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in a single pass over the template, so
    /// substituted values are never scanned for further placeholders. Unknown
    /// placeholders are left as they are.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after = &rest[open + 2..];

            match after.find("}}") {
                Some(close) => match vars.get(&after[..close]) {
                    Some(value) => {
                        result.push_str(value);
                        rest = &after[close + 2..];
                    }
                    None => {
                        result.push_str("{{");
                        rest = after;
                    }
                },
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Render the advisor user prompt for a context and augmented query.
    pub fn advisor_user(&self, context: &str, query: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        vars.insert("query".to_string(), query.to_string());
        self.render_with_custom(&self.advisor.user, &vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_advisor_prompt() {
        let prompts = Prompts::default();
        assert!(prompts.advisor.system.starts_with("You are a nutrition expert."));

        let user = prompts.advisor_user("Recipe: Dal", "lentils for None. Optimize for fiber.");
        assert_eq!(
            user,
            "Context: Recipe: Dal\nQuery: lentils for None. Optimize for fiber.\nProvide: 1. Recommended recipes. 2. Substitutions for restrictions/allergies. 3. Nutritional analysis. 4. Why it matches health condition."
        );
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");

        assert_eq!(Prompts::render("{{unknown}} and {{name", &vars), "{{unknown}} and {{name");
    }

    #[test]
    fn test_placeholders_in_values_stay_literal() {
        let prompts = Prompts::default();

        for _ in 0..20 {
            let user = prompts.advisor_user("Recipe: Dal", "what is {{context}}?");
            assert!(user.starts_with("Context: Recipe: Dal\nQuery: what is {{context}}?\n"));
        }
    }

    #[test]
    fn test_custom_file_and_variables() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "system = \"You cook for {{{{household}}}}.\"").unwrap();
        writeln!(file, "user = \"{{{{query}}}} | {{{{context}}}}\"").unwrap();
        file.flush().unwrap();

        let mut vars = HashMap::new();
        vars.insert("household".to_string(), "two".to_string());
        vars.insert("query".to_string(), "ignored".to_string());

        let path = file.path().to_string_lossy().to_string();
        let prompts = Prompts::load(Some(&path), Some(&vars)).unwrap();

        let system = prompts.render_with_custom(&prompts.advisor.system, &HashMap::new());
        assert_eq!(system, "You cook for two.");
        assert_eq!(prompts.advisor_user("ctx", "soup"), "soup | ctx");
    }
}
