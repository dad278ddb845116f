//! Auth API errors

use crate::http::HttpError;
use thiserror::Error;

/// Error returned by every [`crate::AuthApi`] operation
///
/// Each variant carries the message a user should see. When the server
/// supplied a message it is used verbatim; otherwise the operation's fallback
/// text is used (e.g. `Login failed`).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No response was received (connection failure or timeout)
    #[error("{message}")]
    Transport {
        /// User-facing message
        message: String,
        /// Diagnostic detail
        detail: String,
    },

    /// The server rejected the credentials or token (HTTP 401)
    #[error("{message}")]
    Rejected {
        /// User-facing message
        message: String,
        /// Message from the server's error body, if any
        server_message: Option<String>,
    },

    /// Any other non-success status
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// User-facing message
        message: String,
        /// Message from the server's error body, if any
        server_message: Option<String>,
    },

    /// The server answered 2xx with a body that is undecodable or incomplete
    #[error("{0}")]
    InvalidResponse(String),
}

/// Result type for auth API operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Message used when a login/signup response carries no token
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from server";

impl AuthError {
    /// Normalize a transport error, using `fallback` when the server gave no message
    pub fn from_http(error: HttpError, fallback: &str) -> Self {
        if error.is_decode() {
            tracing::debug!("Undecodable response body: {}", error.detail());
            return AuthError::InvalidResponse(INVALID_RESPONSE_MESSAGE.to_string());
        }

        let server_message = error.server_message().map(str::to_string);
        let message = server_message
            .clone()
            .unwrap_or_else(|| fallback.to_string());

        match error.status_code() {
            None => AuthError::Transport {
                message,
                detail: error.detail().to_string(),
            },
            Some(401) => AuthError::Rejected {
                message,
                server_message,
            },
            Some(status) => AuthError::Api {
                status,
                message,
                server_message,
            },
        }
    }

    /// Human-readable message for display
    pub fn message(&self) -> &str {
        match self {
            AuthError::Transport { message, .. }
            | AuthError::Rejected { message, .. }
            | AuthError::Api { message, .. } => message,
            AuthError::InvalidResponse(message) => message,
        }
    }

    /// Message the server put in its error body, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AuthError::Rejected { server_message, .. } | AuthError::Api { server_message, .. } => {
                server_message.as_deref()
            }
            _ => None,
        }
    }

    /// HTTP status code, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Rejected { .. } => Some(401),
            AuthError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the server rejected the credentials or token
    pub fn is_rejected(&self) -> bool {
        matches!(self, AuthError::Rejected { .. })
    }
}
