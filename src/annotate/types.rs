//! Annotation request data structures

use crate::items::ItemId;
use crate::remote::RemoteError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Phase of the annotation workflow
///
/// ```text
/// Idle ──► Generating ──► Ready ──► Applying ──► Done ──► Idle
///              │                       │
///              └──────► Failed ◄───────┘ ──► Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Generating,
    Ready,
    Applying,
    Done,
    Failed,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::Ready => "ready",
            Self::Applying => "applying",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Whether a remote call is outstanding in this phase
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Generating | Self::Applying)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity token of one annotation request
///
/// Tokens increase monotonically per pipeline, so a response carrying an
/// older token can always be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RequestId(pub(crate) u64);

impl RequestId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The single active generate/apply workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationRequest {
    pub id: RequestId,
    pub target: ItemId,
    pub phase: Phase,
    /// Text returned by the generation call, present from `Ready` on
    pub generated_description: Option<String>,
    /// Operator-edited text that will be applied
    pub draft: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl AnnotationRequest {
    pub(crate) fn new(id: RequestId, target: ItemId) -> Self {
        Self {
            id,
            target,
            phase: Phase::Generating,
            generated_description: None,
            draft: None,
            started_at: Utc::now(),
        }
    }

    /// Text an apply would send now
    #[must_use]
    pub fn pending_text(&self) -> Option<&str> {
        self.draft.as_deref().or(self.generated_description.as_deref())
    }
}

/// Record of the most recently finished request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishedRequest {
    pub id: RequestId,
    pub target: ItemId,
    /// `Done` or `Failed`
    pub outcome: Phase,
    /// Phase the request was in when it failed
    pub failed_during: Option<Phase>,
    #[serde(skip)]
    pub error: Option<RemoteError>,
    /// Draft at the time the request finished
    pub draft: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl FinishedRequest {
    pub(crate) fn done(request: AnnotationRequest) -> Self {
        Self {
            id: request.id,
            target: request.target,
            outcome: Phase::Done,
            failed_during: None,
            error: None,
            draft: request.draft,
            started_at: request.started_at,
            finished_at: Utc::now(),
        }
    }

    pub(crate) fn failed(request: AnnotationRequest, error: RemoteError) -> Self {
        Self {
            id: request.id,
            target: request.target,
            outcome: Phase::Failed,
            failed_during: Some(request.phase),
            error: Some(error),
            draft: request.draft,
            started_at: request.started_at,
            finished_at: Utc::now(),
        }
    }

    /// Whether this request failed while applying and still has its draft
    #[must_use]
    pub fn is_resumable(&self) -> bool {
        self.failed_during == Some(Phase::Applying) && self.draft.is_some()
    }
}

/// Permission to issue one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct GenerateTicket {
    pub id: RequestId,
    pub target: ItemId,
}

/// Permission to issue one apply call
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ApplyTicket {
    pub id: RequestId,
    pub target: ItemId,
    /// Text to send, taken from the current draft
    pub description: String,
}
