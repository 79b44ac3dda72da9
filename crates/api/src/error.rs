//! Error types for `bugcrowd-api`.

use serde_json::Value;
use thiserror::Error;

/// Classified failure of a single API call.
///
/// Nothing is recovered locally: every variant travels unchanged to the caller, which owns any
/// retry decision.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials are missing or empty. Raised before any network activity.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote API answered with a non-2xx status.
    #[error("API returned {status} {}: {body}", reason(.status))]
    HttpStatus { status: u16, body: Value },

    /// A 2xx response body was not valid JSON.
    #[error("decode error: {0}")]
    Decode(String),

    /// Connection-level failure below HTTP (DNS, TLS, refused connection, timeout).
    #[error("http transport error: {0}")]
    Transport(String),

    /// The request could not be built (unsupported query shape, unbuildable URL).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status of an [`ApiError::HttpStatus`] failure.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn reason(status: &u16) -> &'static str {
    reqwest::StatusCode::from_u16(*status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(crate::redact::describe_reqwest_error(value))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
