//! Error types for the REST client

use blogdesk_core::Error as CoreError;
use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised while talking to the admin API
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure: connection refused, timeout, TLS
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server returned {status}{}", suffix(.message))]
    Status {
        /// HTTP status code
        status: u16,
        /// `message` field of the error body, if any
        message: Option<String>,
    },

    /// The server answered 2xx but reported `success: false`
    #[error("Request rejected{}", suffix(.message))]
    Rejected {
        /// `message` field of the body, if any
        message: Option<String>,
    },

    /// 401/403, or a protected call attempted without a credential
    #[error("Not authorized: {message}")]
    Unauthorized {
        /// What was refused
        message: String,
    },

    /// The requested record does not exist
    #[error("{resource} not found")]
    NotFound {
        /// Kind of record
        resource: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Local I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the core crate, e.g. credential storage or validation
    #[error(transparent)]
    Core(#[from] CoreError),
}

fn suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl ClientError {
    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Check if the error should send the user back to login
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
            || matches!(self, Self::Core(CoreError::Authentication(_)))
    }

    /// Server-supplied message, if the server sent one
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Core(inner) => inner,
            ClientError::Unauthorized { message } => Self::Authentication(message),
            ClientError::NotFound { resource } => Self::NotFound { resource },
            ClientError::Status { message, .. } | ClientError::Rejected { message } => {
                Self::Network { message }
            }
            // Transport details go to the log, not to the user.
            ClientError::Http(_) | ClientError::Decode(_) => Self::network_silent(),
            ClientError::Io(err) => Self::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_display() {
        let err = ClientError::Status {
            status: 400,
            message: Some("Title already exists".to_string()),
        };
        assert_eq!(err.to_string(), "Server returned 400: Title already exists");

        let err = ClientError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "Server returned 500");
    }

    #[test]
    fn test_conversion_into_core_error() {
        let core: CoreError = ClientError::unauthorized("token expired").into();
        assert!(core.requires_login());

        let core: CoreError = ClientError::Rejected {
            message: Some("Invalid credentials".to_string()),
        }
        .into();
        assert_eq!(core.message_or("fallback"), "Invalid credentials");

        let core: CoreError = ClientError::Rejected { message: None }.into();
        assert_eq!(core.message_or("Update failed!"), "Update failed!");

        let core: CoreError = ClientError::not_found("Blog").into();
        assert_eq!(core.user_message(), "Blog not found");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ClientError::unauthorized("x").is_unauthorized());
        assert!(ClientError::Core(CoreError::Authentication("x".to_string())).is_unauthorized());
        assert!(!ClientError::not_found("Blog").is_unauthorized());
    }
}
