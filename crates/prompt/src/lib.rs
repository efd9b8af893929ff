//! Prompt system for Switchboard.
//!
//! - YAML-based prompt definitions
//! - Built-in routing and synthesis prompts, overridable per workspace
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{builtin_prompt, load_prompt, CONTROLLER_ROUTE, SYNTHESIZER_ANSWER};
pub use types::{
    BuiltPrompt, OutputFormat, PromptDefinition, PromptInputSpec, PromptOutputSpec, SamplingSpec,
};
