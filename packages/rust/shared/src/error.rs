//! Error types for ContentForge.
//!
//! Library crates use [`ContentForgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ContentForge operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentForgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Recipe parsing or step execution error.
    #[error("recipe error: {message}")]
    Recipe { message: String },

    /// Content definition lookup or mutation error.
    #[error("definition error: {0}")]
    Definition(String),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (missing fields, bad shapes, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A requested document does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ContentForgeError>;

impl ContentForgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a recipe error from any displayable message.
    pub fn recipe(msg: impl Into<String>) -> Self {
        Self::Recipe {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ContentForgeError::config("missing database path");
        assert_eq!(err.to_string(), "config error: missing database path");

        let err = ContentForgeError::recipe("step 3 has no name");
        assert!(err.to_string().contains("step 3"));

        let err = ContentForgeError::NotFound("item abc".into());
        assert_eq!(err.to_string(), "not found: item abc");
    }

    #[test]
    fn json_errors_convert() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: ContentForgeError = parse.unwrap_err().into();
        assert!(err.to_string().starts_with("serialization error"));
    }
}
