//! Item store module
//!
//! Turns the remote product listing into display-ready catalog items and
//! keeps the current snapshot of them.
//!
//! # Snapshot lifecycle
//!
//! ```text
//! GET /api/products ──► RawListing ──► ItemStore::load ──► Arc<ItemSnapshot>
//!                                           ▲                    │
//!                                           │               current()
//!                          invalidate() ────┘ (stale until next load)
//! ```
//!
//! Snapshots are never patched in place. Every load installs a new one with a
//! higher generation number.

pub mod error;
pub mod store;
pub mod types;

pub use error::ItemError;
pub use store::ItemStore;
pub use types::{
    BadgeTone, Item, ItemId, ItemSnapshot, RawImage, RawListing, RawProduct, RawVariant,
    StatusTag,
};
