//! Error types for the annotation pipeline

use super::types::{Phase, RequestId};
use crate::remote::RemoteError;
use thiserror::Error;

/// Errors that can occur while generating or applying a description
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnnotateError {
    /// Generation needs exactly one selected item
    #[error("Select exactly one product to generate a description (selected: {selected})")]
    SelectionCount { selected: usize },

    /// A generation or apply call is already outstanding
    #[error("A request is already {0}")]
    Busy(Phase),

    /// The requested transition is not available in this phase
    #[error("Nothing to apply while {0}")]
    NotReady(Phase),

    /// The generation or apply call failed; the pipeline is back to idle
    #[error("Remote call failed: {0}")]
    Remote(#[from] RemoteError),

    /// A response arrived for a request that is no longer current
    #[error("Dropped response for stale request {request}")]
    Stale {
        request: RequestId,
        current: Option<RequestId>,
    },

    /// No failed apply with a draft to resume from
    #[error("No failed apply to resume")]
    NothingToResume,
}

impl AnnotateError {
    /// Whether this is a transient notification rather than a failed request
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        matches!(
            self,
            Self::SelectionCount { .. } | Self::Busy(_) | Self::NotReady(_) | Self::NothingToResume
        )
    }

    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}
