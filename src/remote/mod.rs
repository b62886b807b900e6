//! Remote collaborator seams
//!
//! The core never talks to the network directly. The listing fetch and the
//! description generate/apply calls go through these traits, which
//! [`crate::client::RestClient`] implements over HTTP.

use crate::items::{ItemId, RawListing};
use async_trait::async_trait;
use thiserror::Error;

/// A remote call failed
///
/// Carries the service message, or the transport failure text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Source of the raw product listing
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the full listing
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the listing cannot be retrieved or decoded.
    async fn fetch_listing(&self) -> Result<RawListing, RemoteError>;
}

/// Generates and applies item descriptions
#[async_trait]
pub trait DescriptionService: Send + Sync {
    /// Generate a description for one item
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` on transport failure or a `success: false` reply.
    async fn generate(&self, item: ItemId) -> Result<String, RemoteError>;

    /// Write `description` to the item
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` on transport failure or a `success: false` reply.
    async fn apply(&self, item: ItemId, description: &str) -> Result<(), RemoteError>;
}
