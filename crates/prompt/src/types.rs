//! Prompt definitions and rendered prompts.

use serde::{Deserialize, Serialize};

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub id: String,

    pub title: String,

    /// Schema version, `x.y`
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Variables the templates reference
    #[serde(default)]
    pub input: PromptInputSpec,

    /// Sampling parameters sent along with the rendered prompt
    #[serde(default)]
    pub sampling: SamplingSpec,

    /// Optional system message (Handlebars syntax)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// User message (Handlebars syntax)
    pub template: String,

    #[serde(default)]
    pub output: PromptOutputSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptInputSpec {
    #[serde(default)]
    pub variables: Vec<String>,
}

/// Per-prompt sampling overrides. Unset fields use the backend default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(rename = "maxTokens", default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptOutputSpec {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Shape the model is asked to reply in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

/// A rendered prompt ready to send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    pub prompt_id: String,
    pub system: Option<String>,
    pub user: String,
    pub sampling: SamplingSpec,
    pub format: OutputFormat,
}
