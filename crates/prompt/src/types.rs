//! Prompt definitions and rendered prompts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt definition, either built in or loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Lookup key, also the override file stem
    pub id: String,

    pub title: String,

    /// "major.minor"
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Placeholders the template must reference
    #[serde(default)]
    pub variables: Vec<String>,

    /// Handlebars source
    pub template: String,
}

/// A rendered prompt and where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltPrompt {
    /// Text sent as the user message
    pub user: String,

    pub prompt_id: String,

    /// Names of the variables bound at render time, sorted
    pub variables: Vec<String>,
}

impl BuiltPrompt {
    pub fn new(user: String, prompt_id: String, variables: &HashMap<String, String>) -> Self {
        let mut names: Vec<String> = variables.keys().cloned().collect();
        names.sort();
        Self {
            user,
            prompt_id,
            variables: names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: rag.answer
title: Guide answer
apiVersion: "1.0"
variables: [context, question]
template: |
  Context: {{context}}
  Question: {{question}}
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "rag.answer");
        assert_eq!(def.api_version, "1.0");
        assert_eq!(def.variables, vec!["context", "question"]);
        assert!(def.created_by.is_empty());
        assert!(def.template.starts_with("Context: {{context}}"));
    }

    #[test]
    fn test_built_prompt_records_sorted_variable_names() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "test".to_string());
        vars.insert("context".to_string(), "a long context".to_string());

        let built = BuiltPrompt::new("User message".to_string(), "rag.answer".to_string(), &vars);

        assert_eq!(built.user, "User message");
        assert_eq!(built.prompt_id, "rag.answer");
        assert_eq!(built.variables, vec!["context", "question"]);
    }
}
