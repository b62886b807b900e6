//! Error types for the REST client

use crate::remote::RemoteError;
use thiserror::Error;

/// Errors that can occur talking to the storefront backend
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the body could not be read
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status without a readable error envelope
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not the expected JSON shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The backend answered `success: false`
    #[error("{0}")]
    Rejected(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<ClientError> for RemoteError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected(message) => Self::new(message),
            other => Self::new(other.to_string()),
        }
    }
}
