//! Error types and handling infrastructure for lttview.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types and `anyhow` for application-level error handling with context.
//!
//! ## Design Principles
//!
//! - **User-friendly messages**: Errors should provide actionable feedback
//! - **Per-record recovery**: A malformed record is a [`DecodeError`], never a fatal error
//! - **Consistency**: Standardized Result type across all modules

use thiserror::Error;

/// The main error type for lttview operations.
#[derive(Error, Debug)]
pub enum LttviewError {
    /// No connection to the event source could be established at startup
    #[error("Event source unavailable: {message}")]
    SourceUnavailable {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The event source failed after startup
    #[error("Event source failed: {message}")]
    Source { message: String },

    /// A single raw record could not be decoded
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// UI and terminal related errors
    #[error("UI operation failed: {message}")]
    UIError { message: String },

    /// Configuration file errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid command line arguments
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Terminal or stream IO errors
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Why one raw record could not be turned into a display item.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("record is empty")]
    EmptyRecord,

    #[error("record is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no \"name\" field")]
    MissingName,

    #[error("\"name\" field is {found}, expected a string")]
    NameNotText { found: &'static str },
}

/// Standard Result type for lttview operations.
pub type Result<T> = std::result::Result<T, LttviewError>;

impl LttviewError {
    /// Create a SourceUnavailable error caused by an IO failure
    pub fn source_unavailable(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a Source error with a descriptive message
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create a UIError with a descriptive message
    pub fn ui(message: impl Into<String>) -> Self {
        Self::UIError {
            message: message.into(),
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an InvalidArgument error with a descriptive message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether this error should abort startup with a non-zero exit status
    pub fn is_startup_fatal(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. } | Self::ConfigError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let unavailable = LttviewError::source_unavailable(
            "cannot spawn babeltrace2",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(
            unavailable.to_string(),
            "Event source unavailable: cannot spawn babeltrace2"
        );

        let name_err = DecodeError::NameNotText { found: "a number" };
        assert_eq!(
            name_err.to_string(),
            "\"name\" field is a number, expected a string"
        );

        let wrapped: LttviewError = DecodeError::MissingName.into();
        assert_eq!(
            wrapped.to_string(),
            "Decode failed: record has no \"name\" field"
        );
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(
            LttviewError::ui("Terminal resize failed"),
            LttviewError::UIError { .. }
        ));
        assert!(matches!(
            LttviewError::source("reader thread died"),
            LttviewError::Source { .. }
        ));
        assert!(matches!(
            LttviewError::other("Unknown error"),
            LttviewError::Other { .. }
        ));
    }

    #[test]
    fn test_startup_fatal_classification() {
        let unavailable = LttviewError::SourceUnavailable {
            message: "refused".to_string(),
            source: None,
        };
        assert!(unavailable.is_startup_fatal());
        assert!(LttviewError::config("bad tick").is_startup_fatal());
        assert!(!LttviewError::Decode(DecodeError::EmptyRecord).is_startup_fatal());
        assert!(!LttviewError::ui("draw failed").is_startup_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: LttviewError = io_err.into();
        assert!(matches!(err, LttviewError::Io(_)));
    }
}
