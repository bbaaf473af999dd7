/*
[INPUT]:  Error sources (HTTP transport, API envelope, serialization, validation)
[OUTPUT]: Structured error types tagged with a user-facing kind
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification shown to users and used for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connectivity problem: could not reach the backend
    Network,
    /// Backend answered with a failure
    Server,
    /// Input rejected on the client before any request
    Validation,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Network => "network",
            ErrorKind::Server => "server",
            ErrorKind::Validation => "validation",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Main error type for the MeshCraft adapter
#[derive(Error, Debug)]
pub enum MeshcraftError {
    /// HTTP transport failed (connect, DNS, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-2xx status or `success: false`
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Missing or rejected session token
    #[error("Not signed in or session expired")]
    Unauthorized,

    /// Client-side input check failed
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Response was well-formed JSON but not what the endpoint promises
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request exceeded the configured timeout
    #[error("Connection timeout after {duration}s")]
    Timeout { duration: u64 },
}

impl MeshcraftError {
    /// Tag assigned where the error was produced; never derived from the message text
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshcraftError::Http(err) if err.is_decode() || err.is_status() => ErrorKind::Server,
            MeshcraftError::Http(_) | MeshcraftError::Timeout { .. } => ErrorKind::Network,
            MeshcraftError::Api { .. }
            | MeshcraftError::Unauthorized
            | MeshcraftError::Serialization(_)
            | MeshcraftError::InvalidResponse(_) => ErrorKind::Server,
            MeshcraftError::Validation { .. } => ErrorKind::Validation,
            MeshcraftError::UrlParse(_) | MeshcraftError::Config(_) => ErrorKind::Unknown,
        }
    }

    /// Message suitable for a toast or inline error label
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Network => "Network error, please check your connection".to_string(),
            ErrorKind::Validation => self.to_string(),
            ErrorKind::Server => match self {
                MeshcraftError::Api { message, .. } => message.clone(),
                MeshcraftError::Unauthorized => "Please sign in again".to_string(),
                _ => "Server error, please try again later".to_string(),
            },
            ErrorKind::Unknown => "Something went wrong".to_string(),
        }
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            MeshcraftError::Api { code, .. } => *code >= 500,
            other => other.kind() == ErrorKind::Network,
        }
    }

    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(self, MeshcraftError::Unauthorized)
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        MeshcraftError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        MeshcraftError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Result type alias for MeshCraft operations
pub type Result<T> = std::result::Result<T, MeshcraftError>;
