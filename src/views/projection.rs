//! Filtered and sorted projection of an item snapshot

use super::types::{EMPTY_STATE_DESCRIPTION, EMPTY_STATE_TITLE, ViewCriteria};
use crate::items::{Item, ItemId, ItemSnapshot};
use std::sync::Arc;

/// Items of one snapshot that pass a view's criteria, in display order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    generation: u64,
    items: Vec<Arc<Item>>,
}

/// Placeholder copy for an empty projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyState {
    pub title: &'static str,
    pub description: &'static str,
}

impl Projection {
    /// Filter `snapshot` by `criteria` and sort the survivors
    ///
    /// Sorting is stable, so items that compare equal keep listing order.
    #[must_use]
    pub fn apply(criteria: &ViewCriteria, snapshot: &ItemSnapshot) -> Self {
        let mut items: Vec<Arc<Item>> = snapshot
            .items()
            .iter()
            .filter(|item| criteria.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| criteria.sort.compare(a, b));

        Self {
            generation: snapshot.generation(),
            items,
        }
    }

    /// Generation of the snapshot this projection was built from
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn items(&self) -> &[Arc<Item>] {
        &self.items
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Empty-state copy, if there is nothing to show
    #[must_use]
    pub fn empty_state(&self) -> Option<EmptyState> {
        self.items.is_empty().then_some(EmptyState {
            title: EMPTY_STATE_TITLE,
            description: EMPTY_STATE_DESCRIPTION,
        })
    }
}
