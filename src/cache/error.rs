//! Error types for cache refreshes

use crate::items::ItemError;
use crate::remote::RemoteError;
use thiserror::Error;

/// A refresh failed; the previous snapshot stays current and stale
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// The listing could not be fetched
    #[error("Failed to fetch listing: {0}")]
    Fetch(#[from] RemoteError),

    /// The listing was fetched but could not be turned into items
    #[error("Failed to load listing: {0}")]
    Load(#[from] ItemError),
}
