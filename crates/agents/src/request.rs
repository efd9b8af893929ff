//! Rendered prompt to completion request.

use switchboard_llm::LlmRequest;
use switchboard_prompt::{BuiltPrompt, OutputFormat};

pub(crate) fn completion_request(built: BuiltPrompt, model: &str) -> LlmRequest {
    let mut request = LlmRequest::new(built.user, model);
    if let Some(system) = built.system {
        request = request.with_system(system);
    }
    if let Some(temperature) = built.sampling.temperature {
        request = request.with_temperature(temperature);
    }
    if let Some(max_tokens) = built.sampling.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }
    if built.format == OutputFormat::Json {
        request = request.with_json_output();
    }
    request
}
