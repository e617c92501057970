//! Error taxonomy shared by the API layer, the form and the dashboard.
//!
//! Every failure a caller can observe collapses into one of four classes.
//! Each carries an optional human-readable message, usually the `message`
//! field of the server's error body.

use thiserror::Error;

/// Errors returned by request parsing, the API layer and the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No credential, or the server rejected it (401/403). Fatal for the
    /// session, never retried.
    #[error("not authenticated{}", suffix(.0))]
    Unauthenticated(Option<String>),

    /// The payload was rejected (400/422) or failed local validation.
    #[error("validation failed{}", suffix(.0))]
    Validation(Option<String>),

    /// The record no longer exists (404).
    #[error("record not found{}", suffix(.0))]
    NotFound(Option<String>),

    /// The server was unreachable, timed out, failed with an unexpected
    /// status, or sent a body that could not be decoded.
    #[error("transport failure{}", suffix(.0))]
    Transport(Option<String>),
}

fn suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

/// Coarse class of an `ApiError`, without its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    Validation,
    NotFound,
    Transport,
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(Some(message.into()))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(Some(message.into()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated(_) => ErrorKind::Unauthenticated,
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }

    /// The server- or validator-supplied message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated(m) | Self::Validation(m) | Self::NotFound(m) | Self::Transport(m) => {
                m.as_deref()
            }
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport(Some(format!("malformed payload: {err}")))
    }
}
