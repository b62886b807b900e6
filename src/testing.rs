//! Testing utilities for storedesk
//!
//! This module provides scripted stand-ins for the remote collaborators and
//! a few fixture builders. Collaborators that need to be observed mid-call
//! are gated with [`tokio::sync::Notify`]: the call signals when it starts,
//! then waits until the test releases it.
//!
//! Only available when compiled with `cfg(test)`.

use crate::annotate::Invalidator;
use crate::items::{ItemId, RawListing, RawProduct, RawVariant};
use crate::remote::{DescriptionService, ListingSource, RemoteError};
use crate::selection::SelectionState;
use crate::views::{Latency, MemoryPersistence, ViewChange, ViewError, ViewPersistence};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// Start/release gate for a pending collaborator call
#[derive(Debug, Default)]
struct Gate {
    enabled: bool,
    entered: Notify,
    release: Notify,
}

impl Gate {
    fn closed() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    async fn pass(&self) {
        self.entered.notify_one();
        if self.enabled {
            self.release.notified().await;
        }
    }
}

/// View persistence that confirms immediately
#[must_use]
pub fn instant_persistence() -> Arc<dyn ViewPersistence> {
    Arc::new(MemoryPersistence::new(Latency {
        create: Duration::ZERO,
        mutate: Duration::ZERO,
    }))
}

/// View persistence that holds every call until released, or always fails
#[derive(Debug, Default)]
pub struct GatedPersistence {
    gate: Gate,
    failure: Option<String>,
}

impl GatedPersistence {
    /// Hold each call until [`Self::release`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            gate: Gate::closed(),
            failure: None,
        }
    }

    /// Fail every call immediately with `message`
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            gate: Gate::default(),
            failure: Some(message.to_string()),
        }
    }

    /// Hold each call until released, then fail it with `message`
    #[must_use]
    pub fn failing_on_release(message: &str) -> Self {
        Self {
            gate: Gate::closed(),
            failure: Some(message.to_string()),
        }
    }

    /// Wait until a call is pending
    pub async fn wait_for_pending(&self) {
        self.gate.entered.notified().await;
    }

    /// Let one pending call finish
    pub fn release(&self) {
        self.gate.release.notify_one();
    }
}

#[async_trait]
impl ViewPersistence for GatedPersistence {
    async fn persist(&self, _change: &ViewChange) -> Result<(), ViewError> {
        self.gate.pass().await;
        match &self.failure {
            Some(message) => Err(ViewError::Persistence(message.clone())),
            None => Ok(()),
        }
    }
}

/// Invalidator that only counts requests
#[derive(Debug, Default)]
pub struct CountingInvalidator {
    count: AtomicUsize,
}

impl CountingInvalidator {
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Invalidator for CountingInvalidator {
    fn request_refresh(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Description service replaying queued results
///
/// With an empty queue, generation returns a canned description and apply
/// succeeds.
#[derive(Debug, Default)]
pub struct ScriptedDescriptions {
    generate: Mutex<VecDeque<Result<String, RemoteError>>>,
    apply: Mutex<VecDeque<Result<(), RemoteError>>>,
    generate_calls: AtomicUsize,
    applied: Mutex<Vec<(ItemId, String)>>,
}

impl ScriptedDescriptions {
    pub fn push_generate(&self, result: Result<String, RemoteError>) {
        self.generate.lock().push_back(result);
    }

    pub fn push_apply(&self, result: Result<(), RemoteError>) {
        self.apply.lock().push_back(result);
    }

    #[must_use]
    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// Every apply call received, in order
    #[must_use]
    pub fn applied(&self) -> Vec<(ItemId, String)> {
        self.applied.lock().clone()
    }
}

#[async_trait]
impl DescriptionService for ScriptedDescriptions {
    async fn generate(&self, item: ItemId) -> Result<String, RemoteError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.generate.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(format!("Generated description for {item}")))
    }

    async fn apply(&self, item: ItemId, description: &str) -> Result<(), RemoteError> {
        self.applied.lock().push((item, description.to_string()));
        let scripted = self.apply.lock().pop_front();
        scripted.unwrap_or(Ok(()))
    }
}

/// Listing source returning a fixed result
#[derive(Debug)]
pub struct ScriptedListing {
    result: Result<RawListing, RemoteError>,
    gate: Gate,
    calls: AtomicUsize,
}

impl ScriptedListing {
    #[must_use]
    pub fn returning(listing: RawListing) -> Self {
        Self {
            result: Ok(listing),
            gate: Gate::default(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Like [`Self::returning`], but each fetch waits for [`Self::release`]
    #[must_use]
    pub fn gated(listing: RawListing) -> Self {
        Self {
            gate: Gate::closed(),
            ..Self::returning(listing)
        }
    }

    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(RemoteError::new(message)),
            gate: Gate::default(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Wait until a fetch has started
    pub async fn wait_for_fetch(&self) {
        self.gate.entered.notified().await;
    }

    pub fn release(&self) {
        self.gate.release.notify_one();
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingSource for ScriptedListing {
    async fn fetch_listing(&self) -> Result<RawListing, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.pass().await;
        self.result.clone()
    }
}

/// Selection holding exactly `ids`
#[must_use]
pub fn selection_of(ids: &[u64]) -> SelectionState {
    SelectionState {
        selected_ids: ids.iter().copied().map(ItemId).collect(),
        all_selected: false,
    }
}

/// Raw listing with one variant per product
#[must_use]
pub fn listing(products: &[(u64, &str)]) -> RawListing {
    RawListing {
        data: products
            .iter()
            .map(|&(id, status)| RawProduct {
                id,
                title: format!("Product {id}"),
                product_type: "Shoes".to_string(),
                status: status.to_string(),
                variants: vec![RawVariant {
                    price: "10.00".to_string(),
                    inventory_quantity: 3,
                }],
                ..RawProduct::default()
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_descriptions_fall_back_to_defaults() {
        let service = ScriptedDescriptions::default();
        service.push_generate(Err(RemoteError::new("first fails")));

        assert!(service.generate(ItemId(1)).await.is_err());
        assert_eq!(
            service.generate(ItemId(1)).await.unwrap(),
            "Generated description for 1"
        );
        assert_eq!(service.generate_calls(), 2);
    }

    #[test]
    fn test_listing_fixture() {
        let raw = listing(&[(4, "draft")]);
        assert_eq!(raw.data.len(), 1);
        assert_eq!(raw.data[0].status, "draft");
    }
}
