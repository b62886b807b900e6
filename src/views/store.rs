//! View store
//!
//! Ordered, session-scoped collection of saved views with exactly one active
//! view. The list always has at least one entry and index 0 is the locked
//! default.
//!
//! Create, rename, duplicate, delete and save are confirmed by a
//! [`ViewPersistence`] collaborator. Only one of them may be pending at a
//! time; a second attempt fails with `ViewError::MutationInFlight`. Each
//! change is applied immediately and rolled back if confirmation fails.
//! Filter edits and tab switches made meanwhile are kept.

use super::error::ViewError;
use super::persistence::{ViewChange, ViewPersistence};
use super::projection::Projection;
use super::types::{AppliedFilter, PrimaryAction, SortKey, ValueFilter, View, ViewCriteria, ViewId};
use crate::items::{ItemId, ItemSnapshot, StatusTag};
use parking_lot::Mutex;
use std::sync::Arc;

/// Name used for the default view when none is configured
pub const DEFAULT_VIEW_NAME: &str = "All";

#[derive(Debug, Clone)]
struct ViewState {
    views: Vec<View>,
    selected: usize,
    /// Filter/sort/query currently applied; seeds new views
    working: ViewCriteria,
    next_seq: u64,
}

impl ViewState {
    fn check_index(&self, index: usize) -> Result<&View, ViewError> {
        self.views.get(index).ok_or(ViewError::OutOfRange {
            index,
            len: self.views.len(),
        })
    }

    fn check_unlocked(&self, index: usize) -> Result<&View, ViewError> {
        let view = self.check_index(index)?;
        if view.locked {
            return Err(ViewError::Locked(index));
        }
        Ok(view)
    }

    fn activate(&mut self, index: usize) {
        self.selected = index;
        self.working = self.views[index].criteria.clone();
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

/// Operator edits made while a view change is pending
#[derive(Debug, Default, Clone, Copy)]
struct Touched {
    selection: bool,
    criteria: bool,
}

#[derive(Debug)]
struct Inner {
    state: ViewState,
    pending: Option<&'static str>,
    touched: Touched,
    visible: Vec<ItemId>,
}

impl Inner {
    fn edit_working(&mut self, edit: impl FnOnce(&mut ViewCriteria)) {
        edit(&mut self.state.working);
        self.touched.criteria = true;
    }

    /// Undo a failed change to the view list
    ///
    /// Selection and criteria edits made while it was pending survive; an
    /// active index that no longer exists falls back to the default view.
    fn roll_back(&mut self, before: ViewState) {
        let touched = std::mem::take(&mut self.touched);
        let state = &mut self.state;
        state.views = before.views;
        state.next_seq = before.next_seq;
        if !touched.criteria {
            state.working = before.working;
        }
        if !touched.selection {
            state.selected = before.selected;
        } else if state.selected >= state.views.len() {
            state.selected = 0;
        }
    }
}

/// Session-scoped saved views
pub struct ViewStore {
    inner: Mutex<Inner>,
    persistence: Arc<dyn ViewPersistence>,
}

impl std::fmt::Debug for ViewStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewStore").field("inner", &self.inner).finish_non_exhaustive()
    }
}

impl ViewStore {
    /// Create a store from view names
    ///
    /// The first name becomes the locked default view. An empty list yields
    /// a single default view named [`DEFAULT_VIEW_NAME`].
    pub fn new<I, S>(names: I, persistence: Arc<dyn ViewPersistence>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut views: Vec<View> = names
            .into_iter()
            .enumerate()
            .map(|(seq, name)| View::new(name.into(), seq as u64, seq == 0, ViewCriteria::default()))
            .collect();
        if views.is_empty() {
            views.push(View::new(DEFAULT_VIEW_NAME.to_string(), 0, true, ViewCriteria::default()));
        }
        let next_seq = views.len() as u64;

        Self {
            inner: Mutex::new(Inner {
                state: ViewState {
                    views,
                    selected: 0,
                    working: ViewCriteria::default(),
                    next_seq,
                },
                pending: None,
                touched: Touched::default(),
                visible: Vec::new(),
            }),
            persistence,
        }
    }

    /// All views in tab order
    #[must_use]
    pub fn views(&self) -> Vec<View> {
        self.inner.lock().state.views.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().state.views.len()
    }

    /// Always false; the default view cannot be removed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().state.views.is_empty()
    }

    /// Index of the active view
    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.inner.lock().state.selected
    }

    #[must_use]
    pub fn active_view(&self) -> View {
        let inner = self.inner.lock();
        inner.state.views[inner.state.selected].clone()
    }

    /// Whether a view change is awaiting confirmation
    #[must_use]
    pub fn is_mutation_pending(&self) -> bool {
        self.inner.lock().pending.is_some()
    }

    /// Make the view at `index` active and load its criteria
    ///
    /// Returns `false` and changes nothing if `index` is out of range.
    pub fn select(&self, index: usize) -> bool {
        let mut inner = self.inner.lock();
        if index >= inner.state.views.len() {
            return false;
        }
        inner.state.activate(index);
        inner.touched = Touched {
            selection: true,
            criteria: true,
        };
        true
    }

    /// Append a view seeded with the current criteria and make it active
    ///
    /// # Errors
    ///
    /// Returns `ViewError::MutationInFlight` if another change is pending, or
    /// `ViewError::Persistence` if confirmation fails (the list is rolled back).
    pub async fn create_view(&self, name: impl Into<String>) -> Result<ViewId, ViewError> {
        let name = name.into();
        self.mutate(move |state| {
            let seq = state.take_seq();
            let view = View::new(name, seq, false, state.working.clone());
            let id = view.id.clone();
            state.views.push(view.clone());
            state.selected = state.views.len() - 1;
            Ok((ViewChange::Create(view), id))
        })
        .await
    }

    /// Rename the view at `index`, remapping its id
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Locked` for the default view, `ViewError::OutOfRange`
    /// for a bad index, plus the errors of [`Self::create_view`].
    pub async fn rename_view(&self, index: usize, new_name: impl Into<String>) -> Result<ViewId, ViewError> {
        let new_name = new_name.into();
        self.mutate(move |state| {
            let old_id = state.check_unlocked(index)?.id.clone();
            let view = &mut state.views[index];
            view.rename(new_name);
            let id = view.id.clone();
            Ok((
                ViewChange::Rename {
                    id: old_id,
                    view: view.clone(),
                },
                id,
            ))
        })
        .await
    }

    /// Append a copy of the view at `index` under a new name and identity,
    /// and make it active
    ///
    /// # Errors
    ///
    /// Same as [`Self::rename_view`].
    pub async fn duplicate_view(&self, index: usize, new_name: impl Into<String>) -> Result<ViewId, ViewError> {
        let new_name = new_name.into();
        self.mutate(move |state| {
            let source = state.check_unlocked(index)?;
            let source_id = source.id.clone();
            let criteria = source.criteria.clone();
            let seq = state.take_seq();
            let view = View::new(new_name, seq, false, criteria);
            let id = view.id.clone();
            state.views.push(view.clone());
            state.activate(state.views.len() - 1);
            Ok((
                ViewChange::Duplicate {
                    source: source_id,
                    view,
                },
                id,
            ))
        })
        .await
    }

    /// Remove the view at `index` and reset the active view to the default
    ///
    /// # Errors
    ///
    /// Same as [`Self::rename_view`].
    pub async fn delete_view(&self, index: usize) -> Result<(), ViewError> {
        self.mutate(move |state| {
            state.check_unlocked(index)?;
            let removed = state.views.remove(index);
            state.activate(0);
            Ok((ViewChange::Delete(removed.id), ()))
        })
        .await
    }

    /// Store the current criteria into the active view
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Locked` while the default view is active (use
    /// [`Self::create_view`] instead), plus the errors of [`Self::create_view`].
    pub async fn save_active_view(&self) -> Result<(), ViewError> {
        self.mutate(|state| {
            let index = state.selected;
            state.check_unlocked(index)?;
            let criteria = state.working.clone();
            let view = &mut state.views[index];
            view.criteria = criteria.clone();
            Ok((
                ViewChange::Save {
                    id: view.id.clone(),
                    criteria,
                },
                (),
            ))
        })
        .await
    }

    /// Save for a custom view, save-as for the default view
    #[must_use]
    pub fn primary_action(&self) -> PrimaryAction {
        if self.inner.lock().state.selected == 0 {
            PrimaryAction::SaveAs
        } else {
            PrimaryAction::Save
        }
    }

    async fn mutate<T, F>(&self, plan: F) -> Result<T, ViewError>
    where
        F: FnOnce(&mut ViewState) -> Result<(ViewChange, T), ViewError>,
    {
        let (change, value, guard) = {
            let mut inner = self.inner.lock();
            if inner.pending.is_some() {
                return Err(ViewError::MutationInFlight);
            }
            let before = inner.state.clone();
            let (change, value) = match plan(&mut inner.state) {
                Ok(planned) => planned,
                Err(err) => {
                    inner.state = before;
                    return Err(err);
                }
            };
            inner.pending = Some(change.kind());
            inner.touched = Touched::default();
            (change, value, PendingGuard { store: self, before: Some(before) })
        };

        tracing::debug!(kind = change.kind(), "view change pending");
        match self.persistence.persist(&change).await {
            Ok(()) => {
                guard.commit();
                tracing::info!(kind = change.kind(), "view change confirmed");
                Ok(value)
            }
            Err(err) => {
                drop(guard);
                tracing::warn!(kind = change.kind(), error = %err, "view change rolled back");
                Err(match err {
                    ViewError::Persistence(_) => err,
                    other => ViewError::Persistence(other.to_string()),
                })
            }
        }
    }

    /// Current filter/sort/query criteria
    #[must_use]
    pub fn working_criteria(&self) -> ViewCriteria {
        self.inner.lock().state.working.clone()
    }

    pub fn set_sort(&self, sort: SortKey) {
        self.inner.lock().edit_working(|working| working.sort = sort);
    }

    /// Replace the status filter; an empty input unsets it
    pub fn set_status_filter<I: IntoIterator<Item = StatusTag>>(&self, statuses: I) {
        let filter = ValueFilter::from_values(statuses);
        self.inner.lock().edit_working(|working| working.status_filter = filter);
    }

    /// Replace the category filter; an empty input unsets it
    pub fn set_category_filter<I, S>(&self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter = ValueFilter::from_values(categories.into_iter().map(Into::into));
        self.inner.lock().edit_working(|working| working.category_filter = filter);
    }

    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.inner.lock().edit_working(|working| working.query = query);
    }

    pub fn clear_status_filter(&self) {
        self.inner.lock().edit_working(|working| working.status_filter = ValueFilter::Unset);
    }

    pub fn clear_category_filter(&self) {
        self.inner.lock().edit_working(|working| working.category_filter = ValueFilter::Unset);
    }

    pub fn clear_query(&self) {
        self.inner.lock().edit_working(|working| working.query.clear());
    }

    /// Remove status, category and query filters at once
    pub fn clear_all_filters(&self) {
        self.inner.lock().edit_working(ViewCriteria::clear_filters);
    }

    /// Chips for the filters currently applied
    #[must_use]
    pub fn applied_filters(&self) -> Vec<AppliedFilter> {
        self.inner.lock().state.working.applied_filters()
    }

    /// Project a snapshot through the current criteria
    #[must_use]
    pub fn project(&self, snapshot: &ItemSnapshot) -> Projection {
        Projection::apply(&self.working_criteria(), snapshot)
    }

    /// Project a snapshot and remember the visible ids
    ///
    /// The active view index is left alone.
    pub fn reproject(&self, snapshot: &ItemSnapshot) -> Projection {
        let mut inner = self.inner.lock();
        let projection = Projection::apply(&inner.state.working, snapshot);
        inner.visible = projection.ids();
        projection
    }

    /// Ids visible after the last [`Self::reproject`]
    #[must_use]
    pub fn visible_ids(&self) -> Vec<ItemId> {
        self.inner.lock().visible.clone()
    }
}

/// Clears the pending flag, rolling back the view list unless committed
///
/// Also covers a mutation future dropped mid-confirmation.
struct PendingGuard<'a> {
    store: &'a ViewStore,
    before: Option<ViewState>,
}

impl PendingGuard<'_> {
    fn commit(mut self) {
        self.before = None;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.store.inner.lock();
        inner.pending = None;
        if let Some(before) = self.before.take() {
            inner.roll_back(before);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{GatedPersistence, instant_persistence};

    fn store(names: &[&str]) -> ViewStore {
        ViewStore::new(names.iter().copied(), instant_persistence())
    }

    fn names(store: &ViewStore) -> Vec<String> {
        store.views().into_iter().map(|v| v.name).collect()
    }

    #[test]
    fn test_new_store_defaults() {
        let store = store(&["All", "Active", "Draft", "Archived"]);
        assert_eq!(store.len(), 4);
        assert_eq!(store.selected_index(), 0);
        let views = store.views();
        assert!(views[0].locked);
        assert!(views[1..].iter().all(|v| !v.locked));
        assert_eq!(views[1].id.as_str(), "Active-1");
        assert_eq!(store.primary_action(), PrimaryAction::SaveAs);
    }

    #[test]
    fn test_new_store_without_names() {
        let store = ViewStore::new(Vec::<String>::new(), instant_persistence());
        assert_eq!(names(&store), vec![DEFAULT_VIEW_NAME]);
        assert!(store.active_view().locked);
    }

    #[test]
    fn test_select_out_of_range_is_noop() {
        let store = store(&["All", "Active"]);
        assert!(store.select(1));
        assert_eq!(store.primary_action(), PrimaryAction::Save);
        assert!(!store.select(2));
        assert_eq!(store.selected_index(), 1);
    }

    #[tokio::test]
    async fn test_create_view_seeds_from_working_criteria() {
        let store = store(&["All"]);
        store.set_status_filter([StatusTag::Archived]);
        store.set_query("boots");

        let id = store.create_view("Archived").await.unwrap();

        assert_eq!(id.as_str(), "Archived-1");
        assert_eq!(store.selected_index(), 1);
        let view = store.active_view();
        assert!(!view.locked);
        assert_eq!(view.criteria.query, "boots");
        assert!(view.criteria.status_filter.allows(&StatusTag::Archived));
        assert!(!view.criteria.status_filter.allows(&StatusTag::Active));
    }

    #[tokio::test]
    async fn test_duplicate_names_allowed() {
        let store = store(&["All"]);
        let first = store.create_view("Same").await.unwrap();
        let second = store.create_view("Same").await.unwrap();
        assert_ne!(first, second);
        assert_eq!(names(&store), vec!["All", "Same", "Same"]);
        // Empty names are accepted as-is
        store.create_view("").await.unwrap();
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_rename_view() {
        let store = store(&["All", "Active"]);
        let id = store.rename_view(1, "Live").await.unwrap();
        assert_eq!(id.as_str(), "Live-1");
        assert_eq!(names(&store), vec!["All", "Live"]);
    }

    #[tokio::test]
    async fn test_locked_view_rejections() {
        let store = store(&["All", "Active"]);
        assert_eq!(store.rename_view(0, "x").await, Err(ViewError::Locked(0)));
        assert_eq!(store.duplicate_view(0, "x").await, Err(ViewError::Locked(0)));
        assert_eq!(store.delete_view(0).await, Err(ViewError::Locked(0)));
        assert_eq!(store.save_active_view().await, Err(ViewError::Locked(0)));
        assert_eq!(names(&store), vec!["All", "Active"]);
        assert!(!store.is_mutation_pending());
    }

    #[tokio::test]
    async fn test_out_of_range_rejection() {
        let store = store(&["All"]);
        assert_eq!(
            store.delete_view(3).await,
            Err(ViewError::OutOfRange { index: 3, len: 1 })
        );
    }

    #[tokio::test]
    async fn test_duplicate_view_selects_copy() {
        let store = store(&["All", "Active"]);
        assert!(store.select(1));
        store.set_status_filter([StatusTag::Active]);
        store.save_active_view().await.unwrap();
        store.select(0);

        let id = store.duplicate_view(1, "Active copy").await.unwrap();

        assert_eq!(store.selected_index(), 2);
        let views = store.views();
        assert_eq!(views[2].id, id);
        assert_ne!(views[2].id, views[1].id);
        assert_eq!(views[2].criteria, views[1].criteria);
        assert_eq!(store.working_criteria(), views[1].criteria);
    }

    #[tokio::test]
    async fn test_delete_resets_active_to_default() {
        let store = store(&["All", "Active", "Draft"]);
        store.select(2);
        store.delete_view(1).await.unwrap();
        assert_eq!(names(&store), vec!["All", "Draft"]);
        assert_eq!(store.selected_index(), 0);
    }

    #[tokio::test]
    async fn test_delete_sequences_keep_index_valid() {
        let store = store(&["All", "A", "B", "C", "D"]);
        for target in [3, 1, 2, 1] {
            store.select(store.len() - 1);
            store.delete_view(target.min(store.len() - 1)).await.unwrap();
            assert!(store.selected_index() < store.len());
            assert!(store.views()[0].locked);
        }
        assert_eq!(names(&store), vec!["All"]);
        assert!(store.delete_view(0).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_persistence_rolls_back() {
        let persistence = Arc::new(GatedPersistence::failing("offline"));
        let store = ViewStore::new(["All", "Active"], persistence);
        store.select(1);

        let result = store.delete_view(1).await;

        assert_eq!(result, Err(ViewError::Persistence("offline".to_string())));
        assert_eq!(names(&store), vec!["All", "Active"]);
        assert_eq!(store.selected_index(), 1);
        assert!(!store.is_mutation_pending());
    }

    #[tokio::test]
    async fn test_pending_mutation_blocks_others() {
        let persistence = Arc::new(GatedPersistence::new());
        let store = Arc::new(ViewStore::new(["All", "Active"], persistence.clone()));

        let task = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create_view("Archived").await })
        };
        persistence.wait_for_pending().await;

        assert!(store.is_mutation_pending());
        assert_eq!(store.rename_view(1, "x").await, Err(ViewError::MutationInFlight));
        assert_eq!(store.rename_view(0, "x").await, Err(ViewError::MutationInFlight));
        // Optimistic append is visible while pending
        assert_eq!(store.len(), 3);

        persistence.release();
        task.await.unwrap().unwrap();
        assert!(!store.is_mutation_pending());
        assert_eq!(names(&store), vec!["All", "Active", "Archived"]);
    }

    #[tokio::test]
    async fn test_rollback_keeps_criteria_edited_while_pending() {
        let persistence = Arc::new(GatedPersistence::failing_on_release("offline"));
        let store = Arc::new(ViewStore::new(["All", "Active"], persistence.clone()));

        let task = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create_view("X").await })
        };
        persistence.wait_for_pending().await;
        store.set_query("boots");
        assert_eq!(store.working_criteria().query, "boots");

        persistence.release();
        let result = task.await.unwrap();

        assert_eq!(result, Err(ViewError::Persistence("offline".to_string())));
        assert_eq!(names(&store), vec!["All", "Active"]);
        assert_eq!(store.selected_index(), 0);
        assert_eq!(store.working_criteria().query, "boots");
    }

    #[tokio::test]
    async fn test_rollback_clamps_tab_selected_while_pending() {
        let persistence = Arc::new(GatedPersistence::failing_on_release("offline"));
        let store = Arc::new(ViewStore::new(["All", "Active"], persistence.clone()));
        store.select(1);
        store.set_status_filter([StatusTag::Active]);

        let task = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.duplicate_view(1, "Copy").await })
        };
        persistence.wait_for_pending().await;
        assert!(store.select(2));

        persistence.release();
        assert!(task.await.unwrap().is_err());

        assert_eq!(names(&store), vec!["All", "Active"]);
        assert_eq!(store.selected_index(), 0);
    }

    #[tokio::test]
    async fn test_untouched_rollback_restores_loaded_criteria() {
        let persistence = Arc::new(GatedPersistence::failing("offline"));
        let store = ViewStore::new(["All", "Active"], persistence);
        store.select(1);
        store.set_query("hats");

        assert!(store.delete_view(1).await.is_err());

        // Delete loaded the default view's criteria; that is undone too
        assert_eq!(store.selected_index(), 1);
        assert_eq!(store.working_criteria().query, "hats");
    }

    #[tokio::test]
    async fn test_dropped_mutation_rolls_back() {
        let persistence = Arc::new(GatedPersistence::new());
        let store = ViewStore::new(["All"], persistence.clone());

        {
            let pending = store.create_view("Never");
            tokio::pin!(pending);
            let poll = futures::poll!(pending.as_mut());
            assert!(poll.is_pending());
            assert!(store.is_mutation_pending());
        }

        assert!(!store.is_mutation_pending());
        assert_eq!(names(&store), vec!["All"]);
    }

    #[test]
    fn test_working_criteria_editing() {
        let store = store(&["All"]);
        store.set_status_filter([StatusTag::Active, StatusTag::Draft]);
        store.set_category_filter(["Shoes"]);
        assert_eq!(store.applied_filters().len(), 2);

        store.clear_status_filter();
        assert_eq!(store.applied_filters().len(), 1);

        store.set_query("x");
        store.clear_all_filters();
        assert!(store.applied_filters().is_empty());
        assert!(store.working_criteria().query.is_empty());

        store.set_category_filter(Vec::<String>::new());
        assert!(store.working_criteria().category_filter.is_unset());
    }
}
