//! Completion error type.

use thiserror::Error;

/// Failures of a completion pass.
///
/// Any of these ends the current turn; the caller decides whether to keep
/// the session going.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// The request never produced a response.
    #[error("network: {0}")]
    Network(String),

    /// No response arrived within the configured timeout.
    #[error("completion timed out: {0}")]
    Timeout(String),

    /// The backend answered with a non-success status.
    #[error("backend api: {0}")]
    Api(String),

    /// The response body did not have the expected shape.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}
