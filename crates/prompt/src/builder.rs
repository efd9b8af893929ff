//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use std::collections::HashMap;
use switchboard_core::{AppError, AppResult};

/// Build a prompt from a definition and input variables.
///
/// Renders the user template (and the optional system template) with
/// Handlebars. HTML escaping is disabled, so queries containing quotes or
/// angle brackets reach the model verbatim.
///
/// # Example
/// ```no_run
/// use switchboard_prompt::{build_prompt, builtin_prompt};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt("synthesizer.answer")?;
/// let mut vars = HashMap::new();
/// vars.insert("query".to_string(), "What is Rust?".to_string());
/// vars.insert("context".to_string(), "Rust is a language.".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    for expected in &definition.input.variables {
        if !variables.contains_key(expected) {
            tracing::warn!(
                prompt = %definition.id,
                variable = %expected,
                "Prompt variable not provided"
            );
        }
    }

    let user = render_template(&definition.template, &variables)?;
    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, &variables))
        .transpose()?;

    Ok(BuiltPrompt {
        prompt_id: definition.id.clone(),
        system,
        user,
        sampling: definition.sampling.clone(),
        format: definition.output.format,
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{builtin_prompt, CONTROLLER_ROUTE};
    use crate::types::{OutputFormat, PromptInputSpec, PromptOutputSpec, SamplingSpec};

    fn create_test_definition(system: Option<&str>) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            input: PromptInputSpec {
                variables: vec!["query".to_string()],
            },
            sampling: SamplingSpec {
                temperature: Some(0.2),
                max_tokens: None,
            },
            system: system.map(str::to_string),
            template: "Question: {{query}}".to_string(),
            output: PromptOutputSpec {
                format: OutputFormat::Json,
            },
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple_template() {
        let result = render_template("Question: {{query}}", &vars(&[("query", "Hello")]));
        assert_eq!(result.unwrap(), "Question: Hello");
    }

    #[test]
    fn test_render_does_not_escape() {
        let result = render_template("{{query}}", &vars(&[("query", "a < b & \"c\"")]));
        assert_eq!(result.unwrap(), "a < b & \"c\"");
    }

    #[test]
    fn test_build_prompt_with_system() {
        let def = create_test_definition(Some("You answer {{query}} questions"));
        let built = build_prompt(&def, vars(&[("query", "Rust")])).unwrap();

        assert_eq!(built.user, "Question: Rust");
        assert_eq!(built.system.as_deref(), Some("You answer Rust questions"));
        assert_eq!(built.prompt_id, "test.prompt");
        assert_eq!(built.sampling.temperature, Some(0.2));
        assert_eq!(built.format, OutputFormat::Json);
    }

    #[test]
    fn test_build_prompt_missing_variable_renders_empty() {
        let def = create_test_definition(None);
        let built = build_prompt(&def, HashMap::new()).unwrap();
        assert_eq!(built.user, "Question: ");
    }

    #[test]
    fn test_controller_prompt_embeds_query_and_flag() {
        let def = builtin_prompt(CONTROLLER_ROUTE).unwrap();
        let built = build_prompt(
            &def,
            vars(&[("query", "summarize this document"), ("document_available", "True")]),
        )
        .unwrap();

        assert!(built.user.contains("User Query: \"summarize this document\""));
        assert!(built.user.contains("PDF Uploaded: True"));
        assert!(built.user.contains("latest papers on AI ethics"));
    }

    #[test]
    fn test_invalid_template_is_prompt_error() {
        let result = render_template("{{#if}}", &HashMap::new());
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }
}
