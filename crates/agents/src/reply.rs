//! Tolerant reading of structured completion replies.
//!
//! Models often wrap the requested JSON object in prose or code fences. A
//! reply is first decoded as-is; failing that, the span from the first `{`
//! to the last `}` is decoded. Only objects count.

use serde_json::Value;
use switchboard_core::{AppError, AppResult};

/// Outcome of reading a completion reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyParse {
    /// A JSON object was recovered.
    Parsed(Value),
    /// No JSON object could be read; carries the raw reply.
    Unparsable(String),
}

impl ReplyParse {
    /// Convert into a result, mapping `Unparsable` to `AppError::Parse`.
    pub fn into_result(self) -> AppResult<Value> {
        match self {
            ReplyParse::Parsed(value) => Ok(value),
            ReplyParse::Unparsable(raw) => Err(AppError::Parse(format!(
                "Could not parse JSON from LLM response: {}",
                raw
            ))),
        }
    }
}

/// Read a JSON object out of a completion reply.
pub fn parse_reply(raw: &str) -> ReplyParse {
    let trimmed = raw.trim();

    if let Some(value) = decode_object(trimmed) {
        return ReplyParse::Parsed(value);
    }

    if let Some(value) = extract_object_span(trimmed).and_then(decode_object) {
        return ReplyParse::Parsed(value);
    }

    ReplyParse::Unparsable(raw.to_string())
}

fn decode_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

/// Greedy span from the first `{` to the last `}`.
fn extract_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_object() {
        let parsed = parse_reply(r#"{"reasoning": "r", "agents": ["WEB_SEARCH_AGENT"]}"#);
        assert_eq!(
            parsed,
            ReplyParse::Parsed(json!({"reasoning": "r", "agents": ["WEB_SEARCH_AGENT"]}))
        );
    }

    #[test]
    fn test_object_in_code_fence() {
        let wrapped = "```json\n{\"agents\": [\"ARXIV_AGENT\"]}\n```";
        assert_eq!(
            parse_reply(wrapped),
            ReplyParse::Parsed(json!({"agents": ["ARXIV_AGENT"]}))
        );
    }

    #[test]
    fn test_object_surrounded_by_prose() {
        let reply = "Sure! Here is my decision: {\"reasoning\": \"news\", \"agents\": [\"WEB_SEARCH_AGENT\"]} Hope it helps.";
        assert!(matches!(parse_reply(reply), ReplyParse::Parsed(_)));
    }

    #[test]
    fn test_two_objects_are_unparsable() {
        // The greedy span covers both objects and the text between them.
        let reply = "{\"a\": 1} and also {\"b\": 2}";
        assert!(matches!(parse_reply(reply), ReplyParse::Unparsable(_)));
    }

    #[test]
    fn test_non_object_json_is_unparsable() {
        assert!(matches!(parse_reply("[1, 2, 3]"), ReplyParse::Unparsable(_)));
        assert!(matches!(parse_reply("\"text\""), ReplyParse::Unparsable(_)));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = parse_reply("I cannot decide.").into_result().unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
        assert!(err.to_string().contains("I cannot decide."));
    }

    #[test]
    fn test_reversed_braces() {
        assert!(matches!(parse_reply("} oops {"), ReplyParse::Unparsable(_)));
    }
}
