//! Catalog item data structures
//!
//! This module defines the display model for catalog entries and the raw
//! listing payload they are built from:
//! - `RawListing` / `RawProduct`: the `GET /api/products` response shape
//! - `Item`: one immutable, display-ready catalog entry
//! - `ItemSnapshot`: the ordered collection of items for one fetch

use super::error::ItemError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Placeholder shown for price and inventory when a product has no variants
pub const MISSING_VARIANT_DISPLAY: &str = "N/A";

/// Opaque, stable identifier of a catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl ItemId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Publication status of a catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTag {
    Active,
    Draft,
    Archived,
}

impl StatusTag {
    /// All statuses in display order
    pub const ALL: [Self; 3] = [Self::Active, Self::Draft, Self::Archived];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Draft => "draft",
            Self::Archived => "archived",
        }
    }

    /// Badge tone used when rendering the status
    ///
    /// Only active items get the success tone; everything else is informational.
    #[must_use]
    pub const fn tone(self) -> BadgeTone {
        match self {
            Self::Active => BadgeTone::Success,
            Self::Draft | Self::Archived => BadgeTone::Info,
        }
    }
}

impl fmt::Display for StatusTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "draft" => Ok(Self::Draft),
            "archived" => Ok(Self::Archived),
            other => Err(other.to_string()),
        }
    }
}

/// Two-value badge tone for status rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Success,
    Info,
}

/// One catalog entry as displayed
///
/// Items are immutable once built. A re-fetch produces new `Item` values;
/// nothing ever patches an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub price_display: String,
    pub status: StatusTag,
    pub inventory_display: String,
    pub category: String,
    /// Rich-text (HTML) description
    pub description: String,
    pub thumbnail_url: Option<String>,
}

impl Item {
    /// Build a display item from a raw product
    ///
    /// Price and inventory are taken from the first (primary) variant.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::UnknownStatus` if the product status is not one of
    /// active, draft or archived.
    pub fn from_raw(raw: &RawProduct) -> Result<Self, ItemError> {
        let status = raw
            .status
            .parse::<StatusTag>()
            .map_err(|status| ItemError::UnknownStatus { id: raw.id, status })?;

        let (price_display, inventory_display) = match raw.variants.first() {
            Some(variant) => (
                format!("${}", variant.price),
                format!("{} in stock", variant.inventory_quantity),
            ),
            None => {
                tracing::warn!(product = raw.id, "product has no variants");
                (
                    MISSING_VARIANT_DISPLAY.to_string(),
                    MISSING_VARIANT_DISPLAY.to_string(),
                )
            }
        };

        Ok(Self {
            id: ItemId(raw.id),
            title: raw.title.clone(),
            price_display,
            status,
            inventory_display,
            category: raw.product_type.clone(),
            description: raw.body_html.clone().unwrap_or_default(),
            thumbnail_url: raw.image.as_ref().map(|image| image.src.clone()),
        })
    }

    /// Badge tone for this item's status
    #[must_use]
    pub const fn tone(&self) -> BadgeTone {
        self.status.tone()
    }
}

/// Immutable, ordered collection of items from one listing fetch
///
/// Snapshots are shared behind `Arc` and replaced wholesale; holders of an
/// old snapshot keep seeing exactly what was loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSnapshot {
    generation: u64,
    items: Vec<Arc<Item>>,
}

impl ItemSnapshot {
    /// Build a snapshot from raw products
    ///
    /// # Errors
    ///
    /// Returns `ItemError` if any product cannot be transformed or two
    /// products share an id.
    pub fn from_listing(listing: &RawListing, generation: u64) -> Result<Self, ItemError> {
        let mut seen = HashSet::with_capacity(listing.data.len());
        let mut items = Vec::with_capacity(listing.data.len());

        for raw in &listing.data {
            if !seen.insert(raw.id) {
                return Err(ItemError::DuplicateId(raw.id));
            }
            items.push(Arc::new(Item::from_raw(raw)?));
        }

        Ok(Self { generation, items })
    }

    /// Build a snapshot directly from items (used by tests and fixtures)
    #[must_use]
    pub fn from_items(items: Vec<Item>, generation: u64) -> Self {
        Self {
            generation,
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    /// Monotonic load counter; 0 means never loaded
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn items(&self) -> &[Arc<Item>] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Arc<Item>> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(|item| item.id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Raw `GET /api/products` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub data: Vec<RawProduct>,
}

impl RawListing {
    /// Parse a listing from its JSON body
    ///
    /// # Errors
    ///
    /// Returns `ItemError::Malformed` if the body is not a valid listing.
    pub fn from_json(body: &str) -> Result<Self, ItemError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// One product as returned by the backing store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProduct {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub variants: Vec<RawVariant>,
    #[serde(default)]
    pub image: Option<RawImage>,
}

/// Product variant; only the first one is displayed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVariant {
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub inventory_quantity: i64,
}

/// Product image reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawImage {
    pub src: String,
}
