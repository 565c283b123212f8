//! Error types for Persona Flux

use thiserror::Error;

/// Errors that can occur while loading a model or scoring an event log
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid scenario pattern `{expr}`: {source}")]
    Pattern {
        expr: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

impl ComputeError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        ComputeError::Configuration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_error_message() {
        let err = ComputeError::EncodingError("key must be a string".to_string());
        assert_eq!(err.to_string(), "Encoding error: key must be a string");
    }

    #[test]
    fn test_pattern_error_keeps_source() {
        let source = regex::Regex::new("^(?!.*phone)").unwrap_err();
        let err = ComputeError::Pattern {
            expr: "^(?!.*phone)".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("Invalid scenario pattern `^(?!.*phone)`"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
