//! Error types for listing transformation
//!
//! Raised when a remote listing payload cannot be turned into an
//! [`ItemSnapshot`](super::ItemSnapshot).

use thiserror::Error;

/// Errors that can occur while loading a listing into the item store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ItemError {
    /// A product carried a status outside active/draft/archived
    #[error("Product {id} has unknown status '{status}'")]
    UnknownStatus { id: u64, status: String },

    /// Two products in one listing share an identifier
    #[error("Duplicate product id {0} in listing")]
    DuplicateId(u64),

    /// The listing payload could not be decoded
    #[error("Malformed listing: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ItemError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
