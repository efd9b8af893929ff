//! Prompt loader for built-in and workspace prompt definitions.

use crate::types::PromptDefinition;
use std::path::Path;
use switchboard_core::{AppError, AppResult};

/// Prompt used by the routing controller.
pub const CONTROLLER_ROUTE: &str = "controller.route";

/// Prompt used by the answer synthesizer.
pub const SYNTHESIZER_ANSWER: &str = "synthesizer.answer";

const BUILTIN_PROMPTS: [(&str, &str); 2] = [
    (
        CONTROLLER_ROUTE,
        include_str!("../prompts/controller.route.yml"),
    ),
    (
        SYNTHESIZER_ANSWER,
        include_str!("../prompts/synthesizer.answer.yml"),
    ),
];

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in the workspace's `.switchboard/prompts/`
/// directory takes precedence; otherwise the built-in definition is used.
///
/// # Arguments
/// * `workspace_path` - Root workspace directory containing `.switchboard/`
/// * `prompt_id` - Prompt identifier (e.g., "controller.route")
///
/// # Example
/// ```no_run
/// use switchboard_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "controller.route")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".switchboard/prompts")
        .join(format!("{}.yml", prompt_id));

    if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        let definition = parse_prompt(&contents, &prompt_file.display().to_string())?;
        tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);
        return Ok(definition);
    }

    builtin_prompt(prompt_id)
}

/// Load a built-in prompt definition.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    let (_, contents) = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;

    parse_prompt(contents, prompt_id)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
