//! Prompt loader for built-in and YAML prompt definitions.

use crate::builtin;
use crate::types::PromptDefinition;
use guide_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Directory, relative to the workspace, holding prompt overrides.
pub const PROMPTS_DIR: &str = ".guide/prompts";

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in `.guide/prompts/` takes precedence over the
/// built-in definition of the same ID.
///
/// # Example
/// ```no_run
/// use guide_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "rag.answer")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompt_path(workspace_path, prompt_id);

    let definition = if prompt_file.is_file() {
        tracing::debug!("Using prompt override {:?}", prompt_file);
        read_prompt_file(&prompt_file)?
    } else {
        builtin::find(prompt_id).ok_or_else(|| {
            AppError::Prompt(format!(
                "Prompt '{}' not found (no built-in and no file at {:?})",
                prompt_id, prompt_file
            ))
        })?
    };

    validate_prompt(&definition)?;

    if definition.id != prompt_id {
        tracing::warn!(
            "Prompt file for '{}' declares id '{}'",
            prompt_id,
            definition.id
        );
    }

    tracing::debug!("Prompt '{}' ready: {}", definition.id, definition.title);

    Ok(definition)
}

fn prompt_path(workspace_path: &Path, prompt_id: &str) -> PathBuf {
    workspace_path
        .join(PROMPTS_DIR)
        .join(format!("{}.yml", prompt_id))
}

fn read_prompt_file(prompt_file: &Path) -> AppResult<PromptDefinition> {
    let contents = std::fs::read_to_string(prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })
}

fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    let required = [
        ("id", def.id.as_str()),
        ("title", def.title.as_str()),
        ("apiVersion", def.api_version.as_str()),
        ("template", def.template.as_str()),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(AppError::Prompt(format!("Prompt {} must not be empty", field)));
    }

    let mut parts = def.api_version.split('.');
    let well_formed = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(major), Some(minor), None)
            if !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
    );
    if !well_formed {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion '{}': expected major.minor",
            def.api_version
        )));
    }

    if let Some(missing) = def
        .variables
        .iter()
        .find(|var| !references_variable(&def.template, var))
    {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' declares variable '{}' but the template never uses it",
            def.id, missing
        )));
    }

    Ok(())
}

fn references_variable(template: &str, var: &str) -> bool {
    template.contains(&format!("{{{{{}}}}}", var))
        || template.contains(&format!("{{{{ {} }}}}", var))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, content: &str) -> PathBuf {
        let prompts_dir = dir.join(PROMPTS_DIR);
        fs::create_dir_all(&prompts_dir).unwrap();

        let file_path = prompts_dir.join(format!("{}.yml", id));
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn valid_yaml(id: &str) -> String {
        format!(
            r#"
id: {}
title: "Short answer"
apiVersion: "1.1"
variables: [context, question]
template: "Use {{{{context}}}} to answer {{{{ question }}}} briefly."
"#,
            id
        )
    }

    #[test]
    fn test_builtin_without_override() {
        let temp_dir = TempDir::new().unwrap();

        let prompt = load_prompt(temp_dir.path(), builtin::RAG_ANSWER_ID).unwrap();
        assert_eq!(prompt.id, builtin::RAG_ANSWER_ID);
        assert!(prompt.template.contains(builtin::FALLBACK_ANSWER));
    }

    #[test]
    fn test_override_takes_precedence() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "rag.answer", &valid_yaml("rag.answer"));

        let prompt = load_prompt(temp_dir.path(), "rag.answer").unwrap();
        assert_eq!(prompt.title, "Short answer");
        assert_eq!(prompt.api_version, "1.1");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_prompt(temp_dir.path(), "nonexistent");
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "invalid", "invalid: yaml: content:");

        let result = load_prompt(temp_dir.path(), "invalid");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bad_api_version() {
        let temp_dir = TempDir::new().unwrap();
        let yaml = valid_yaml("versioned").replace("\"1.1\"", "\"v1\"");
        write_prompt(temp_dir.path(), "versioned", &yaml);

        let err = load_prompt(temp_dir.path(), "versioned").unwrap_err();
        assert!(err.to_string().contains("Invalid apiVersion 'v1'"));
    }

    #[test]
    fn test_rejects_unused_variable() {
        let temp_dir = TempDir::new().unwrap();
        let yaml = r#"
id: partial
title: "No context"
apiVersion: "1.0"
variables: [context, question]
template: "Answer {{question}}"
"#;
        write_prompt(temp_dir.path(), "partial", yaml);

        let err = load_prompt(temp_dir.path(), "partial").unwrap_err();
        assert!(err.to_string().contains("'context'"));
    }

    #[test]
    fn test_rejects_empty_title() {
        let temp_dir = TempDir::new().unwrap();
        let yaml = valid_yaml("untitled").replace("\"Short answer\"", "\"  \"");
        write_prompt(temp_dir.path(), "untitled", &yaml);

        let err = load_prompt(temp_dir.path(), "untitled").unwrap_err();
        assert_eq!(err.to_string(), "Prompt error: Prompt title must not be empty");
    }
}
