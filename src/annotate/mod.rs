//! Annotation pipeline module
//!
//! Generates a description for one selected item, lets the operator review
//! and edit it, then applies it and asks the item cache to refresh.
//!
//! # Lifecycle
//!
//! ```text
//! begin_generate ──► GenerateTicket ──► DescriptionService::generate
//!                                              │
//!                  complete_generate ◄─────────┘   (stale ids dropped)
//!                         │
//!            edit_draft / discard (Ready)
//!                         │
//! begin_apply ──► ApplyTicket ──► DescriptionService::apply
//!                                         │
//!                 complete_apply ◄────────┘ ──► Invalidator::request_refresh
//! ```

pub mod error;
pub mod pipeline;
pub mod types;

pub use error::AnnotateError;
pub use pipeline::{AnnotationPipeline, Invalidator};
pub use types::{AnnotationRequest, ApplyTicket, FinishedRequest, GenerateTicket, Phase, RequestId};
