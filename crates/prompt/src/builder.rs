//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use guide_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Rendering is strict: a placeholder without a matching variable is an
/// error rather than an empty string.
///
/// # Example
/// ```no_run
/// use guide_prompt::{build_prompt, builtin};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("context".to_string(), "Profiles are edited under Settings.".to_string());
/// vars.insert("question".to_string(), "How do I update my profile?".to_string());
///
/// let built = build_prompt(&builtin::rag_answer(), vars)?;
/// println!("{}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let rendered = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(rendered, definition.id.clone(), &variables))
}

fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;

    fn vars(context: &str, question: &str) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        vars.insert("question".to_string(), question.to_string());
        vars
    }

    #[test]
    fn test_render_simple_template() {
        let result = render_template("Question: {{question}}", &vars("", "Hello, world!"));
        assert_eq!(result.unwrap(), "Question: Hello, world!");
    }

    #[test]
    fn test_render_does_not_escape() {
        let result = render_template("{{context}}", &vars("a < b && \"c\"", "q"));
        assert_eq!(result.unwrap(), "a < b && \"c\"");
    }

    #[test]
    fn test_render_template_missing_variable() {
        let result = render_template("Question: {{missing}}", &vars("c", "q"));
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_build_rag_answer() {
        let built = build_prompt(
            &builtin::rag_answer(),
            vars(
                "Open Settings and choose Profile.",
                "What is the process for updating my profile?",
            ),
        )
        .unwrap();

        assert!(built.user.contains("based ONLY on the following context"));
        assert!(built.user.contains(builtin::FALLBACK_ANSWER));
        assert!(built
            .user
            .contains("Context:\nOpen Settings and choose Profile.\n\nQuestion:\nWhat is the process for updating my profile?\n\nAnswer:"));
        assert_eq!(built.prompt_id, builtin::RAG_ANSWER_ID);
        assert_eq!(built.variables, vec!["context", "question"]);
    }
}
