//! Result and error types for semloc.
//!
//! Every failure carries an [`ErrorKind`] discriminator. Hosts that lose
//! structured error types across a process or script boundary can round-trip
//! an error through [`SemlocError::extended_message`] and
//! [`SemlocError::from_extended_message`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for semloc operations
pub type SemlocResult<T> = Result<T, SemlocError>;

/// Errors that can occur while parsing, resolving or generating locators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemlocError {
    /// The locator is malformed, names an unknown role or an unsupported attribute
    #[error("{message}")]
    InvalidLocator {
        /// Error message
        message: String,
    },

    /// The locator is valid but no element matched it
    #[error("{message}")]
    NoSuchElement {
        /// Error message
        message: String,
    },

    /// An argument was misused, e.g. a bare `*` accessible name
    #[error("{message}")]
    Value {
        /// Error message
        message: String,
    },

    /// A batch was started while another one is still open
    #[error("Already in a batch operation")]
    BatchInProgress,

    /// A CSS selector or document could not be used
    #[error("{message}")]
    Html {
        /// Error message
        message: String,
    },
}

/// Discriminator for [`SemlocError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`SemlocError::InvalidLocator`]
    InvalidLocator,
    /// See [`SemlocError::NoSuchElement`]
    NoSuchElement,
    /// See [`SemlocError::Value`]
    Value,
    /// See [`SemlocError::BatchInProgress`]
    BatchInProgress,
    /// See [`SemlocError::Html`]
    Html,
}

impl ErrorKind {
    /// All error kinds
    pub const ALL: [Self; 5] = [
        Self::InvalidLocator,
        Self::NoSuchElement,
        Self::Value,
        Self::BatchInProgress,
        Self::Html,
    ];

    /// Name embedded in extended messages
    #[must_use]
    pub const fn error_name(self) -> &'static str {
        match self {
            Self::InvalidLocator => "InvalidLocatorError",
            Self::NoSuchElement => "NoSuchElementError",
            Self::Value => "ValueError",
            Self::BatchInProgress => "BatchInProgressError",
            Self::Html => "HtmlError",
        }
    }

    /// Look up a kind by its [`error_name`](Self::error_name)
    #[must_use]
    pub fn from_error_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.error_name() == name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_name())
    }
}

impl SemlocError {
    /// Create an invalid locator error
    pub fn invalid_locator(message: impl Into<String>) -> Self {
        Self::InvalidLocator {
            message: message.into(),
        }
    }

    /// Create a no such element error
    pub fn no_such_element(message: impl Into<String>) -> Self {
        Self::NoSuchElement {
            message: message.into(),
        }
    }

    /// Create a value error
    pub fn value(message: impl Into<String>) -> Self {
        Self::Value {
            message: message.into(),
        }
    }

    /// Create an HTML error
    pub fn html(message: impl Into<String>) -> Self {
        Self::Html {
            message: message.into(),
        }
    }

    /// The discriminator of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLocator { .. } => ErrorKind::InvalidLocator,
            Self::NoSuchElement { .. } => ErrorKind::NoSuchElement,
            Self::Value { .. } => ErrorKind::Value,
            Self::BatchInProgress => ErrorKind::BatchInProgress,
            Self::Html { .. } => ErrorKind::Html,
        }
    }

    /// Shorthand for `self.kind().error_name()`
    #[must_use]
    pub const fn error_name(&self) -> &'static str {
        self.kind().error_name()
    }

    /// The message with the error name prepended, e.g.
    /// `NoSuchElementError: Didn't find any elements ...`
    #[must_use]
    pub fn extended_message(&self) -> String {
        format!("{}: {}", self.error_name(), self)
    }

    /// Rebuild an error from the output of [`extended_message`](Self::extended_message).
    ///
    /// Returns `None` when the text doesn't start with a known error name.
    #[must_use]
    pub fn from_extended_message(text: &str) -> Option<Self> {
        let (name, message) = text.split_once(": ")?;
        let error = match ErrorKind::from_error_name(name)? {
            ErrorKind::InvalidLocator => Self::invalid_locator(message),
            ErrorKind::NoSuchElement => Self::no_such_element(message),
            ErrorKind::Value => Self::value(message),
            ErrorKind::BatchInProgress => Self::BatchInProgress,
            ErrorKind::Html => Self::html(message),
        };
        Some(error)
    }
}
