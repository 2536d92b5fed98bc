//! Gateway error types.

use serde_json::Value;
use thiserror::Error;
use todo_core::Rejection;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// No response was received.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status. The body is kept as
    /// JSON when it parses, otherwise as a JSON string.
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: Value },

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Converts into the value stores reject with. Only error responses carry
    /// anything worth showing; everything else becomes `fallback`.
    pub fn into_rejection(self, fallback: &str) -> Rejection {
        match self {
            Self::Status { body, .. } => Rejection::from_body(&body, fallback),
            _ => Rejection::message(fallback),
        }
    }
}
