//! Coalescing refresh of the item snapshot
//!
//! At most one refresh runs at a time. Callers that ask for a refresh while
//! one is outstanding get a handle onto the same shared future instead of
//! starting a second fetch.

use super::error::RefreshError;
use crate::annotate::Invalidator;
use crate::items::{ItemSnapshot, ItemStore};
use crate::remote::ListingSource;
use crate::selection::SelectionManager;
use crate::views::ViewStore;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use std::sync::Arc;

type RefreshFuture = Shared<BoxFuture<'static, Result<u64, RefreshError>>>;

#[derive(Default)]
struct CoordinatorState {
    inflight: Option<(u64, RefreshFuture)>,
    started: u64,
}

struct Inner {
    items: Arc<ItemStore>,
    selection: Arc<SelectionManager>,
    views: Arc<ViewStore>,
    source: Arc<dyn ListingSource>,
    state: Mutex<CoordinatorState>,
}

/// Handle onto an outstanding refresh
///
/// Resolves to the generation of the loaded snapshot. Cloned handles and
/// coalesced requests resolve to the same result.
#[derive(Clone)]
#[must_use]
pub struct RefreshHandle {
    id: u64,
    coalesced: bool,
    future: RefreshFuture,
}

impl RefreshHandle {
    /// Sequence number of the refresh this handle waits on
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Whether this request joined a refresh that was already running
    #[must_use]
    pub const fn is_coalesced(&self) -> bool {
        self.coalesced
    }

    /// Wait for the refresh to finish
    ///
    /// # Errors
    ///
    /// Returns `RefreshError` if the fetch or the load failed.
    pub async fn wait(self) -> Result<u64, RefreshError> {
        self.future.await
    }
}

impl std::fmt::Debug for RefreshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshHandle")
            .field("id", &self.id)
            .field("coalesced", &self.coalesced)
            .finish_non_exhaustive()
    }
}

/// Invalidates and refreshes the item snapshot
///
/// On completion the selection is cleared and the active view is re-applied
/// to the new snapshot (the active view index is left alone).
#[derive(Clone)]
pub struct CacheCoordinator {
    inner: Arc<Inner>,
}

impl CacheCoordinator {
    pub fn new(
        items: Arc<ItemStore>,
        selection: Arc<SelectionManager>,
        views: Arc<ViewStore>,
        source: Arc<dyn ListingSource>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                items,
                selection,
                views,
                source,
                state: Mutex::new(CoordinatorState::default()),
            }),
        }
    }

    /// Mark the snapshot stale and start a refresh, or join the running one
    ///
    /// Inside a tokio runtime the refresh is driven by a spawned task, so it
    /// completes even if the handle is dropped. Otherwise it runs when the
    /// handle is awaited.
    pub fn invalidate_and_refresh(&self) -> RefreshHandle {
        let mut state = self.inner.state.lock();
        if let Some((id, future)) = &state.inflight {
            tracing::debug!(refresh = id, "joining in-flight refresh");
            return RefreshHandle {
                id: *id,
                coalesced: true,
                future: future.clone(),
            };
        }

        state.started += 1;
        let id = state.started;
        self.inner.items.invalidate();
        let future = Self::run(Arc::clone(&self.inner), id).boxed().shared();
        state.inflight = Some((id, future.clone()));
        drop(state);

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let _task = runtime.spawn(future.clone());
        }
        tracing::info!(refresh = id, "refresh started");

        RefreshHandle {
            id,
            coalesced: false,
            future,
        }
    }

    /// Current snapshot, refreshing first if it is stale
    ///
    /// # Errors
    ///
    /// Returns `RefreshError` if a needed refresh failed.
    pub async fn ensure_fresh(&self) -> Result<Arc<ItemSnapshot>, RefreshError> {
        if self.inner.items.is_stale() {
            self.invalidate_and_refresh().wait().await?;
        }
        Ok(self.inner.items.current())
    }

    /// Number of refreshes started (coalesced requests not counted)
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.inner.state.lock().started
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.state.lock().inflight.is_some()
    }

    async fn run(inner: Arc<Inner>, id: u64) -> Result<u64, RefreshError> {
        let result = Self::refresh(&inner).await;

        {
            let mut state = inner.state.lock();
            if state.inflight.as_ref().is_some_and(|(current, _)| *current == id) {
                state.inflight = None;
            }
        }

        match &result {
            Ok(generation) => tracing::info!(refresh = id, generation, "refresh finished"),
            Err(err) => tracing::warn!(refresh = id, error = %err, "refresh failed"),
        }
        result
    }

    async fn refresh(inner: &Inner) -> Result<u64, RefreshError> {
        let listing = inner.source.fetch_listing().await?;
        let snapshot = inner.items.load(&listing)?;
        inner.selection.clear();
        inner.views.reproject(&snapshot);
        Ok(snapshot.generation())
    }
}

impl std::fmt::Debug for CacheCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCoordinator")
            .field("refresh_count", &self.refresh_count())
            .field("is_refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}

impl Invalidator for CacheCoordinator {
    fn request_refresh(&self) {
        let handle = self.invalidate_and_refresh();
        tracing::debug!(refresh = handle.id(), coalesced = handle.is_coalesced(), "refresh requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemId;
    use crate::remote::RemoteError;
    use crate::testing::{ScriptedListing, instant_persistence, listing};

    struct Fixture {
        items: Arc<ItemStore>,
        selection: Arc<SelectionManager>,
        views: Arc<ViewStore>,
        source: Arc<ScriptedListing>,
        coordinator: CacheCoordinator,
    }

    fn fixture(source: ScriptedListing) -> Fixture {
        let items = Arc::new(ItemStore::new());
        let selection = Arc::new(SelectionManager::new());
        let views = Arc::new(ViewStore::new(["All", "Active"], instant_persistence()));
        let source = Arc::new(source);
        let coordinator = CacheCoordinator::new(
            Arc::clone(&items),
            Arc::clone(&selection),
            Arc::clone(&views),
            source.clone(),
        );
        Fixture {
            items,
            selection,
            views,
            source,
            coordinator,
        }
    }

    #[tokio::test]
    async fn test_refresh_loads_and_clears_selection() {
        let f = fixture(ScriptedListing::returning(listing(&[(1, "active"), (2, "draft")])));
        let first = f.coordinator.invalidate_and_refresh().wait().await.unwrap();
        assert_eq!(first, 1);

        let snapshot = f.items.current();
        assert!(f.selection.select(ItemId(2), &snapshot));
        f.views.select(1);
        f.views.set_status_filter([crate::items::StatusTag::Active]);

        let second = f.coordinator.invalidate_and_refresh().wait().await.unwrap();
        assert_eq!(second, 2);
        assert!(f.selection.is_empty());
        assert_eq!(f.views.selected_index(), 1);
        assert_eq!(f.views.visible_ids(), vec![ItemId(1)]);
        assert!(!f.items.is_stale());
        assert!(!f.coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn test_overlapping_requests_coalesce() {
        let f = fixture(ScriptedListing::gated(listing(&[(1, "active")])));

        let first = f.coordinator.invalidate_and_refresh();
        f.source.wait_for_fetch().await;
        let second = f.coordinator.invalidate_and_refresh();
        let third = f.coordinator.invalidate_and_refresh();

        assert!(!first.is_coalesced());
        assert!(second.is_coalesced() && third.is_coalesced());
        assert_eq!(first.id(), second.id());
        assert!(f.items.is_stale());

        f.source.release();
        let results = futures::future::join3(first.wait(), second.wait(), third.wait()).await;
        assert_eq!(results.0, Ok(1));
        assert_eq!(results.1, Ok(1));
        assert_eq!(results.2, Ok(1));
        assert_eq!(f.source.calls(), 1);
        assert_eq!(f.coordinator.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot_stale() {
        let f = fixture(ScriptedListing::failing("backend down"));
        let err = f.coordinator.invalidate_and_refresh().wait().await.unwrap_err();
        assert_eq!(err, RefreshError::Fetch(RemoteError::new("backend down")));
        assert!(f.items.is_stale());
        assert!(!f.coordinator.is_refreshing());

        // A later request starts a fresh attempt
        let handle = f.coordinator.invalidate_and_refresh();
        assert!(!handle.is_coalesced());
        assert_eq!(f.coordinator.refresh_count(), 2);
    }

    #[tokio::test]
    async fn test_ensure_fresh_only_fetches_when_stale() {
        let f = fixture(ScriptedListing::returning(listing(&[(1, "active")])));
        let snapshot = f.coordinator.ensure_fresh().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        f.coordinator.ensure_fresh().await.unwrap();
        assert_eq!(f.source.calls(), 1);
    }

    #[tokio::test]
    async fn test_request_refresh_runs_without_handle() {
        let f = fixture(ScriptedListing::returning(listing(&[(1, "active")])));
        f.coordinator.request_refresh();
        while f.coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }
        assert_eq!(f.items.current().generation(), 1);
    }
}
