//! Session wiring
//!
//! A [`Session`] owns one instance of every store for one operator session
//! and connects them: the cache coordinator refreshes the item store,
//! clears the selection and re-projects the active view, and the annotation
//! pipeline signals the coordinator after a successful apply.
//!
//! ```text
//!  ListingSource ──► CacheCoordinator ──► ItemStore
//!                          │  ▲                │
//!          clear()  ◄──────┘  │ request_refresh │ current()
//!   SelectionManager          │                ▼
//!          │ snapshot()  AnnotationPipeline   ViewStore::reproject
//!          └─────────────────►│
//!                     DescriptionService
//! ```

use crate::annotate::{AnnotateError, AnnotationPipeline};
use crate::cache::{CacheCoordinator, RefreshError};
use crate::client::RestClient;
use crate::config::StoredeskConfig;
use crate::items::{ItemId, ItemStore};
use crate::remote::{DescriptionService, ListingSource};
use crate::selection::SelectionManager;
use crate::views::{MemoryPersistence, Projection, ViewPersistence, ViewStore};
use std::sync::Arc;

/// One operator session over the catalog
pub struct Session {
    items: Arc<ItemStore>,
    selection: Arc<SelectionManager>,
    views: Arc<ViewStore>,
    cache: CacheCoordinator,
    pipeline: AnnotationPipeline,
}

impl Session {
    pub fn new<I, S>(
        source: Arc<dyn ListingSource>,
        service: Arc<dyn DescriptionService>,
        persistence: Arc<dyn ViewPersistence>,
        view_names: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = Arc::new(ItemStore::new());
        let selection = Arc::new(SelectionManager::new());
        let views = Arc::new(ViewStore::new(view_names, persistence));
        let cache = CacheCoordinator::new(
            Arc::clone(&items),
            Arc::clone(&selection),
            Arc::clone(&views),
            source,
        );
        let pipeline = AnnotationPipeline::new(service, Arc::new(cache.clone()));

        Self {
            items,
            selection,
            views,
            cache,
            pipeline,
        }
    }

    /// Session against the configured backend, with in-memory views
    #[must_use]
    pub fn from_config(config: &StoredeskConfig) -> Self {
        let client = Arc::new(RestClient::from_config(config));
        let persistence = Arc::new(MemoryPersistence::new(config.view_latency.into()));
        Self::new(
            client.clone(),
            client,
            persistence,
            config.default_views.iter().cloned(),
        )
    }

    #[must_use]
    pub fn items(&self) -> &ItemStore {
        &self.items
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    #[must_use]
    pub fn views(&self) -> &ViewStore {
        &self.views
    }

    #[must_use]
    pub const fn cache(&self) -> &CacheCoordinator {
        &self.cache
    }

    #[must_use]
    pub const fn pipeline(&self) -> &AnnotationPipeline {
        &self.pipeline
    }

    /// Make sure the listing is loaded and project it through the active view
    ///
    /// # Errors
    ///
    /// Returns `RefreshError` if a needed fetch fails.
    pub async fn load(&self) -> Result<Projection, RefreshError> {
        let snapshot = self.cache.ensure_fresh().await?;
        Ok(self.views.reproject(&snapshot))
    }

    /// Current snapshot projected through the working criteria
    #[must_use]
    pub fn visible(&self) -> Projection {
        self.views.project(&self.items.current())
    }

    /// Select an item from the current snapshot
    ///
    /// Returns `false` if the item is not in the snapshot.
    pub fn select(&self, id: ItemId) -> bool {
        self.selection.select(id, &self.items.current())
    }

    /// Select every currently visible item
    pub fn select_all_visible(&self) {
        self.selection.select_all(self.visible().items());
    }

    /// Generate a description for the single selected item
    ///
    /// # Errors
    ///
    /// See [`AnnotationPipeline::generate`].
    pub async fn generate(&self) -> Result<String, AnnotateError> {
        self.pipeline.generate(&self.selection.snapshot()).await
    }

    /// Apply the reviewed draft
    ///
    /// # Errors
    ///
    /// See [`AnnotationPipeline::apply`].
    pub async fn apply(&self, edited: Option<String>) -> Result<(), AnnotateError> {
        self.pipeline.apply(edited).await
    }
}
