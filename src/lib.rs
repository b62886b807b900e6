//! Storedesk - catalog listing, saved views and description annotation
//!
//! This library provides the session core of an embedded storefront admin:
//! an immutable item snapshot store, an operator selection, saved
//! filter/sort views, a single-flight generate → review → apply pipeline for
//! item descriptions, and a coalescing cache refresh that ties them together.

use thiserror::Error;

pub mod annotate;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod items;
pub mod output;
pub mod remote;
pub mod selection;
pub mod session;
pub mod views;

#[cfg(test)]
pub mod testing;

pub use session::Session;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum StoredeskError {
    /// Listing transform error
    #[error("Item error: {0}")]
    ItemError(#[from] items::ItemError),
    /// Saved view error
    #[error("View error: {0}")]
    ViewError(#[from] views::ViewError),
    /// Annotation pipeline error
    #[error("{0}")]
    AnnotateError(#[from] annotate::AnnotateError),
    /// Listing refresh error
    #[error("Refresh error: {0}")]
    RefreshError(#[from] cache::RefreshError),
    /// Backend client error
    #[error("Client error: {0}")]
    ClientError(#[from] client::ClientError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Interactive prompt error
    #[error("Prompt error: {0}")]
    PromptError(#[from] dialoguer::Error),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// JSON output error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
