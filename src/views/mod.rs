//! Saved views module
//!
//! A view is a named filter/sort/query preset over the item listing. The
//! [`ViewStore`] keeps the ordered views for one session, tracks which one is
//! active and holds the working criteria the listing is projected through.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use storedesk::views::{MemoryPersistence, ViewStore};
//!
//! # async fn demo() -> Result<(), storedesk::views::ViewError> {
//! let store = ViewStore::new(["All", "Active"], Arc::new(MemoryPersistence::default()));
//! store.set_query("boots");
//! let id = store.create_view("Boots").await?;
//! assert_eq!(store.active_view().id, id);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod persistence;
pub mod projection;
pub mod store;
pub mod types;

pub use error::ViewError;
pub use persistence::{Latency, MemoryPersistence, ViewChange, ViewPersistence};
pub use projection::{EmptyState, Projection};
pub use store::{DEFAULT_VIEW_NAME, ViewStore};
pub use types::{
    AppliedFilter, FilterKey, PrimaryAction, SortDirection, SortField, SortKey, ValueFilter,
    View, ViewCriteria, ViewCriteriaBuilder, ViewId,
};
