use thiserror::Error;

use tiffin_core::DomainError;

/// Shown when the backend gives no usable message.
pub const GENERIC_NETWORK_ERROR: &str = "network error, please try again";

/// Failure talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("parse error: {0}")]
    Parse(String),
}

impl TransportError {
    /// Text to show the operator: the backend's own message when it sent one.
    pub fn user_message(&self) -> &str {
        match self {
            TransportError::Api { message, .. } => message,
            TransportError::Network(_) | TransportError::Parse(_) => GENERIC_NETWORK_ERROR,
        }
    }
}

/// Outcome of a session operation that did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Rejected client-side; nothing was sent.
    #[error(transparent)]
    Rejected(#[from] DomainError),
    /// The backend could not be reached or refused the request.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SessionError {
    pub fn user_message(&self) -> &str {
        match self {
            SessionError::Rejected(err) => err.reason(),
            SessionError::Transport(err) => err.user_message(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid API URL '{0}'")]
    InvalidUrl(String),
    #[error("invalid HTTP timeout '{0}' (expected whole seconds)")]
    InvalidTimeout(String),
}
