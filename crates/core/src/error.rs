//! Error types for Switchboard.
//!
//! A single error enum covers every failure category in the workspace:
//! caller input, completion backends, retrieval providers, reply parsing,
//! configuration, I/O, the passage index, and prompts.

use thiserror::Error;

/// Unified error type for Switchboard.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Completion, retrieval and parse failures are recovered by the routing
/// layer; the rest propagate to the caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Caller supplied something unusable (e.g. a non-PDF upload)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Text-completion backend unreachable, rate limited, or silent
    #[error("Completion failed: {0}")]
    Completion(String),

    /// A retrieval provider (web, paper, document) failed
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// No structured object could be read from a completion reply
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Passage index and document library errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the error is the caller's fault rather than the system's.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::InvalidInput(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_is_client_error() {
        let err = AppError::InvalidInput("bad upload".to_string());
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Invalid input: bad upload");
    }

    #[test]
    fn test_completion_is_not_client_error() {
        let err = AppError::Completion("rate limited".to_string());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AppError = json_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
