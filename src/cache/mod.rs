//! Cache coordination module
//!
//! Keeps the item snapshot fresh after mutations and re-applies the
//! session's selection policy and active view to every new snapshot.

pub mod coordinator;
pub mod error;

pub use coordinator::{CacheCoordinator, RefreshHandle};
pub use error::RefreshError;
