//! Error types for blogdesk

use std::{error::Error as StdError, fmt};

/// Main error type for blogdesk
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// A required field is missing or malformed; raised before any request is sent
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Missing, expired or rejected credential
    Authentication(String),

    /// Request failed or the server answered with a non-success result
    Network {
        /// Message supplied by the server, if any
        message: Option<String>,
    },

    /// Not found error
    NotFound {
        /// Resource that was not found
        resource: String,
    },

    /// Serialization error
    Serialization(serde_json::Error),

    /// CSV export error
    Csv(csv::Error),

    /// Other error
    Other(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a validation error for `field`
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a network error carrying a server-supplied message
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: Some(message.into()),
        }
    }

    /// Create a network error with nothing useful to show
    #[must_use]
    pub const fn network_silent() -> Self {
        Self::Network { message: None }
    }

    /// Whether the caller should be sent back to the login view
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Message suitable for showing to the operator, without the category prefix
    #[must_use]
    pub fn user_message(&self) -> String {
        self.message_or("Request failed")
    }

    /// Like [`Error::user_message`], but `fallback` replaces a missing server message
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::Network { message } => message.clone().unwrap_or_else(|| fallback.to_string()),
            Self::Authentication(msg) | Self::Other(msg) => msg.clone(),
            Self::NotFound { resource } => format!("{resource} not found"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Validation { field, message } => {
                write!(f, "Validation error: {field} - {message}")
            }
            Self::Authentication(msg) => write!(f, "Authentication failed: {msg}"),
            Self::Network { message: Some(message) } => write!(f, "Request failed: {message}"),
            Self::Network { message: None } => write!(f, "Request failed"),
            Self::NotFound { resource } => write!(f, "Resource not found: {resource}"),
            Self::Serialization(err) => write!(f, "Serialization error: {err}"),
            Self::Csv(err) => write!(f, "CSV error: {err}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}
