//! Error types for view operations
//!
//! Every variant is an expected, user-facing condition. None of them leave
//! the view list in a partially mutated state.

use thiserror::Error;

/// Errors that can occur during view operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ViewError {
    /// The default view cannot be renamed, duplicated, deleted or saved over
    #[error("View at index {0} is locked")]
    Locked(usize),

    /// No view exists at the index
    #[error("No view at index {index} (have {len})")]
    OutOfRange { index: usize, len: usize },

    /// Another create/rename/duplicate/delete/save is still pending
    #[error("Another view change is still in progress")]
    MutationInFlight,

    /// The persistence collaborator failed; the view list was rolled back
    #[error("Failed to persist view change: {0}")]
    Persistence(String),
}

impl ViewError {
    /// Whether this is a transient notification rather than a failed request
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}
