//! Selection manager
//!
//! Tracks which catalog items the operator has selected. The manager only
//! references item ids; it never owns items. Ids are validated against the
//! snapshot the caller is looking at, so the selection can never name an
//! item that is not on screen.
//!
//! Policy on re-fetch: the selection is cleared outright rather than
//! reconciled against the new snapshot.

use crate::items::{Item, ItemId, ItemSnapshot};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Point-in-time copy of the selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Selected item ids (order irrelevant)
    pub selected_ids: HashSet<ItemId>,
    /// Set when the whole visible set was selected at once
    pub all_selected: bool,
}

impl SelectionState {
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected_ids.is_empty()
    }

    /// The selected id, if exactly one item is selected
    #[must_use]
    pub fn single(&self) -> Option<ItemId> {
        if self.selected_ids.len() == 1 {
            self.selected_ids.iter().next().copied()
        } else {
            None
        }
    }

    /// Label for the "N selected" counter ("All" when everything is selected)
    #[must_use]
    pub fn count_label(&self) -> String {
        if self.all_selected {
            "All".to_string()
        } else {
            self.selected_ids.len().to_string()
        }
    }
}

/// Session-scoped selection of item ids
#[derive(Debug, Default)]
pub struct SelectionManager {
    state: Mutex<SelectionState>,
}

impl SelectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the selection
    ///
    /// Returns `false` (and changes nothing) if the id is not in `snapshot`.
    pub fn select(&self, id: ItemId, snapshot: &ItemSnapshot) -> bool {
        if !snapshot.contains(id) {
            tracing::debug!(%id, "ignoring selection of unknown item");
            return false;
        }
        let mut state = self.state.lock();
        state.all_selected = false;
        state.selected_ids.insert(id);
        true
    }

    /// Remove an item from the selection; returns whether it was selected
    pub fn deselect(&self, id: ItemId) -> bool {
        let mut state = self.state.lock();
        state.all_selected = false;
        state.selected_ids.remove(&id)
    }

    /// Flip an item's membership; returns the new membership
    ///
    /// Unknown ids are never added.
    pub fn toggle(&self, id: ItemId, snapshot: &ItemSnapshot) -> bool {
        let mut state = self.state.lock();
        state.all_selected = false;
        if state.selected_ids.remove(&id) {
            false
        } else if snapshot.contains(id) {
            state.selected_ids.insert(id);
            true
        } else {
            false
        }
    }

    /// Select exactly the given visible items and set the all-selected flag
    pub fn select_all(&self, visible: &[Arc<Item>]) {
        let mut state = self.state.lock();
        state.selected_ids = visible.iter().map(|item| item.id).collect();
        state.all_selected = !visible.is_empty();
    }

    /// Drop every selected id
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.selected_ids.clear();
        state.all_selected = false;
    }

    /// Copy of the current selection
    #[must_use]
    pub fn snapshot(&self) -> SelectionState {
        self.state.lock().clone()
    }

    #[must_use]
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.state.lock().selected_ids.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().selected_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().selected_ids.is_empty()
    }
}
