use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the session engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid attachment: {0} is not an image media type")]
    InvalidAttachment(String),

    #[error("Nothing to submit: enter some text or attach an image")]
    NotSubmittable,

    #[error("The provider returned an empty response")]
    EmptyResponse,

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Turn {0} does not exist")]
    OutOfRange(usize),

    #[error("Turn {0} is not an answer and cannot take feedback")]
    InvalidTarget(usize),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// The recorded kind for failures that end up in the ledger as a fallback turn
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::EmptyResponse => Some(ErrorKind::EmptyResponse),
            Self::ProviderError(_) => Some(ErrorKind::ProviderError),
            _ => None,
        }
    }
}

/// Failure kind recorded as the session's `last_error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyResponse,
    ProviderError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyResponse => write!(f, "empty response"),
            Self::ProviderError => write!(f, "provider error"),
        }
    }
}
