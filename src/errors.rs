//! Error types for the Valyu SDK.

use thiserror::Error;

use crate::http::HttpError;

/// Result type alias using [`ValyuError`].
pub type Result<T> = std::result::Result<T, ValyuError>;

/// Unified error enum for the Valyu SDK.
///
/// Per-call API methods return typed responses carrying a `success` flag and
/// an `error` string, so this enum only surfaces from client construction,
/// the blocking wait helpers, and binary asset fetches.
#[derive(Debug, Error)]
pub enum ValyuError {
    /// No API key was provided and `VALYU_API_KEY` is not set.
    #[error("missing api key: pass one explicitly or set VALYU_API_KEY")]
    MissingApiKey,

    /// HTTP request failed (transport or non-2xx response).
    #[error("http error: {0}")]
    Http(#[from] HttpError),

    /// A polled job, task, or batch reported a terminal failure, or its
    /// status could not be read.
    #[error("job failed: {0}")]
    JobFailed(String),

    /// Wall-clock deadline exceeded while waiting for a terminal state.
    #[error("timeout: {0}")]
    Timeout(String),
}

impl ValyuError {
    /// Create a job failure error.
    pub fn job_failed(message: impl Into<String>) -> Self {
        ValyuError::JobFailed(message.into())
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        ValyuError::Timeout(message.into())
    }

    /// Check whether this is a poll timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ValyuError::Timeout(_))
    }
}
