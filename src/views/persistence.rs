//! View persistence collaborator
//!
//! View changes are confirmed by an asynchronous collaborator before they are
//! final. Views live only in process memory, so the production implementation
//! is [`MemoryPersistence`]: an in-process mirror with a configurable
//! confirmation delay.

use super::error::ViewError;
use super::types::{View, ViewCriteria, ViewId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

/// One view change awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewChange {
    Create(View),
    Rename { id: ViewId, view: View },
    Duplicate { source: ViewId, view: View },
    Delete(ViewId),
    Save { id: ViewId, criteria: ViewCriteria },
}

impl ViewChange {
    /// Short name for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Rename { .. } => "rename",
            Self::Duplicate { .. } => "duplicate",
            Self::Delete(_) => "delete",
            Self::Save { .. } => "save",
        }
    }
}

/// Confirms view changes
///
/// Implementations report failures as `ViewError::Persistence`.
#[async_trait]
pub trait ViewPersistence: Send + Sync {
    /// Confirm a change
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Persistence` if the change cannot be recorded.
    async fn persist(&self, change: &ViewChange) -> Result<(), ViewError>;
}

/// Confirmation delays for [`MemoryPersistence`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    /// Delay before a create is confirmed
    pub create: Duration,
    /// Delay before rename/duplicate/delete/save is confirmed
    pub mutate: Duration,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            create: Duration::from_millis(500),
            mutate: Duration::from_millis(1),
        }
    }
}

/// In-process view mirror
///
/// Keeps the confirmed views in creation order so they can be inspected,
/// and never fails.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    latency: Latency,
    views: Mutex<Vec<View>>,
}

impl MemoryPersistence {
    #[must_use]
    pub fn new(latency: Latency) -> Self {
        Self {
            latency,
            views: Mutex::new(Vec::new()),
        }
    }

    /// Confirmed views, in the order they were recorded
    #[must_use]
    pub fn views(&self) -> Vec<View> {
        self.views.lock().clone()
    }
}

#[async_trait]
impl ViewPersistence for MemoryPersistence {
    async fn persist(&self, change: &ViewChange) -> Result<(), ViewError> {
        let delay = match change {
            ViewChange::Create(_) => self.latency.create,
            _ => self.latency.mutate,
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut views = self.views.lock();
        match change {
            ViewChange::Create(view) | ViewChange::Duplicate { view, .. } => {
                views.push(view.clone());
            }
            ViewChange::Rename { id, view } => {
                if let Some(existing) = views.iter_mut().find(|v| &v.id == id) {
                    *existing = view.clone();
                }
            }
            ViewChange::Delete(id) => views.retain(|v| &v.id != id),
            ViewChange::Save { id, criteria } => {
                if let Some(existing) = views.iter_mut().find(|v| &v.id == id) {
                    existing.criteria = criteria.clone();
                }
            }
        }
        Ok(())
    }
}
