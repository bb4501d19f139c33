use quill_core::backend_errors::{self, BackendErrorReport};
use quill_core::error::CoreError;

use crate::session::SessionError;

/// Message shown when the backend could not be reached at all.
pub const UNREACHABLE_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";

/// Errors from the client layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A domain-level error (not found, validation, forbidden, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Reading or writing the persisted session failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// HTTP status, for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Core(CoreError::NotFound { .. })) || self.status() == Some(404)
    }

    /// What to show the user for this error.
    pub fn report(&self) -> BackendErrorReport {
        match self {
            ApiError::Api { body, .. } => backend_errors::interpret(body),
            ApiError::Request(_) => BackendErrorReport::message(UNREACHABLE_MESSAGE),
            ApiError::Core(CoreError::Internal(_)) => BackendErrorReport::generic(),
            ApiError::Core(CoreError::Validation(msg))
            | ApiError::Core(CoreError::Unauthorized(msg))
            | ApiError::Core(CoreError::Forbidden(msg))
            | ApiError::Core(CoreError::Conflict(msg)) => BackendErrorReport::message(msg.clone()),
            ApiError::Core(err @ CoreError::NotFound { .. }) => {
                BackendErrorReport::message(err.to_string())
            }
            ApiError::Session(err) => BackendErrorReport::message(err.to_string()),
        }
    }
}
