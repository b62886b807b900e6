//! Item store
//!
//! Holds the current [`ItemSnapshot`] and its staleness flag. Loading a
//! listing always swaps in a brand new snapshot; the previous one is left
//! untouched for anyone still holding it.

use super::error::ItemError;
use super::types::{ItemSnapshot, RawListing};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug)]
struct StoreState {
    snapshot: Arc<ItemSnapshot>,
    stale: bool,
    generation: u64,
}

/// Owner of the current listing snapshot
#[derive(Debug)]
pub struct ItemStore {
    state: Mutex<StoreState>,
}

impl ItemStore {
    /// Create an empty store
    ///
    /// The store starts stale so the first read triggers a fetch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                snapshot: Arc::new(ItemSnapshot::default()),
                stale: true,
                generation: 0,
            }),
        }
    }

    /// Transform a raw listing and install it as the current snapshot
    ///
    /// A malformed listing leaves the previous snapshot (and the stale flag)
    /// in place.
    ///
    /// # Errors
    ///
    /// Returns `ItemError` if the listing cannot be transformed.
    pub fn load(&self, raw: &RawListing) -> Result<Arc<ItemSnapshot>, ItemError> {
        let mut state = self.state.lock();
        let snapshot = Arc::new(ItemSnapshot::from_listing(raw, state.generation + 1)?);

        state.generation = snapshot.generation();
        state.snapshot = Arc::clone(&snapshot);
        state.stale = false;
        drop(state);

        tracing::debug!(
            generation = snapshot.generation(),
            items = snapshot.len(),
            "item snapshot replaced"
        );
        Ok(snapshot)
    }

    /// Current snapshot
    #[must_use]
    pub fn current(&self) -> Arc<ItemSnapshot> {
        Arc::clone(&self.state.lock().snapshot)
    }

    /// Mark the current snapshot stale so the next read refreshes it
    pub fn invalidate(&self) {
        self.state.lock().stale = true;
        tracing::debug!("item snapshot invalidated");
    }

    /// Whether the snapshot needs a refresh before it is trusted
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.state.lock().stale
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}
