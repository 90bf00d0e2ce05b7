//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Input document couldn't be read
    #[error("Failed to read {path}: {source}")]
    Input {
        /// Path as given on the command line
        path: String,
        /// Underlying failure
        source: std::io::Error,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Locator library error
    #[error("{0}")]
    Semloc(#[from] semloc::SemlocError),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// A CSS selector matched nothing
    #[error("No element matches selector {selector}")]
    NoMatch {
        /// The selector
        selector: String,
    },

    /// JSON rendering failed
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create an input error for `path`
    #[must_use]
    pub fn input(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Input {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a no match error
    #[must_use]
    pub fn no_match(selector: impl Into<String>) -> Self {
        Self::NoMatch {
            selector: selector.into(),
        }
    }
}
