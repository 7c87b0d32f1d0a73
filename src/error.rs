//! Crate-level error types.
//!
//! [`HangqingError`] unifies every error source (configuration, HTTP,
//! JSON, terminal) behind a single enum so callers can match on the
//! variant they care about while still using the `?` operator.

use std::fmt;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HangqingError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum HangqingError {
    /// An environment variable held an unusable value.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP request could not be sent or its body could not be read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Terminal or file I/O failed.
    #[error("io error: {0}")]
    Io(String),

    /// The endpoint answered with a non-2xx status.
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: &'static str, status: u16 },

    /// The call did not complete within the per-call timeout.
    #[error("{endpoint} timed out")]
    Timeout { endpoint: &'static str },

    /// The endpoint answered successfully but with nothing to show.
    #[error("{endpoint} returned no data")]
    EmptyResult { endpoint: &'static str },
}

impl HangqingError {
    /// Classifies the error for the per-slice failure marker.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::EmptyResult { .. } => FailureKind::EmptyResult,
            _ => FailureKind::Network,
        }
    }
}

/// Coarse failure classes shown next to stale data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport failure, non-2xx status, timeout or undecodable body.
    Network,
    /// The call succeeded but returned an empty collection.
    EmptyResult,
}

/// Failure marker recorded on a view-state slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&HangqingError> for FetchFailure {
    fn from(err: &HangqingError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
