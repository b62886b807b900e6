//! View data structures
//!
//! This module defines the core data structures for saved views:
//! - `SortKey`: one of the eight product/status/type/description orderings
//! - `ValueFilter`: an optional, non-empty set of accepted values
//! - `ViewCriteria`: sort + status/category filters + search query
//! - `View`: a named, possibly locked, criteria preset

use crate::items::{Item, StatusTag};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Copy shown when a projection has no rows
pub const EMPTY_STATE_TITLE: &str = "No products yet";
/// Hint shown under [`EMPTY_STATE_TITLE`]
pub const EMPTY_STATE_DESCRIPTION: &str = "Try changing the filters or search term";

/// Stable identifier of a view
///
/// Derived from the view name and a per-store sequence number assigned at
/// creation. Renames remap the name part explicitly and keep the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    #[must_use]
    pub fn derive(name: &str, seq: u64) -> Self {
        Self(format!("{name}-{seq}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Column a view sorts by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Product,
    Status,
    Type,
    Description,
}

impl SortField {
    /// Wire name used in sort values ("tone" is the status column)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Status => "tone",
            Self::Type => "type",
            Self::Description => "description",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::Status => "Status",
            Self::Type => "Type",
            Self::Description => "Description",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// A sort column plus direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    /// Every sort option, in menu order
    pub const ALL: [Self; 8] = [
        Self::new(SortField::Product, SortDirection::Ascending),
        Self::new(SortField::Product, SortDirection::Descending),
        Self::new(SortField::Status, SortDirection::Ascending),
        Self::new(SortField::Status, SortDirection::Descending),
        Self::new(SortField::Type, SortDirection::Ascending),
        Self::new(SortField::Type, SortDirection::Descending),
        Self::new(SortField::Description, SortDirection::Ascending),
        Self::new(SortField::Description, SortDirection::Descending),
    ];

    #[must_use]
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        self.field.label()
    }

    /// Direction label as shown next to the column name
    ///
    /// Status and type read alphabetically, the free-text columns do not.
    #[must_use]
    pub const fn direction_label(self) -> &'static str {
        match (self.field, self.direction) {
            (SortField::Status | SortField::Type, SortDirection::Ascending) => "A-Z",
            (SortField::Status | SortField::Type, SortDirection::Descending) => "Z-A",
            (_, SortDirection::Ascending) => "Ascending",
            (_, SortDirection::Descending) => "Descending",
        }
    }

    /// Order two items under this key
    #[must_use]
    pub fn compare(self, a: &Item, b: &Item) -> Ordering {
        let ordering = match self.field {
            SortField::Product => cmp_text(&a.title, &b.title),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::Type => cmp_text(&a.category, &b.category),
            SortField::Description => cmp_text(&a.description, &b.description),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::new(SortField::Product, SortDirection::Ascending)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field.as_str(), self.direction.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.to_string() == s.trim())
            .ok_or_else(|| format!("Unknown sort option '{s}'"))
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Filter over one column: either unset, or a non-empty set of accepted values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "values")]
pub enum ValueFilter<T: Ord> {
    Unset,
    Values(BTreeSet<T>),
}

impl<T: Ord> ValueFilter<T> {
    /// Build a filter from values; an empty input yields `Unset`
    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        let set: BTreeSet<T> = values.into_iter().collect();
        if set.is_empty() {
            Self::Unset
        } else {
            Self::Values(set)
        }
    }

    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Whether `value` passes this filter
    pub fn allows(&self, value: &T) -> bool {
        match self {
            Self::Unset => true,
            Self::Values(values) => values.contains(value),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        match self {
            Self::Unset => None,
            Self::Values(values) => Some(values.iter()),
        }
        .into_iter()
        .flatten()
    }
}

impl<T: Ord> Default for ValueFilter<T> {
    fn default() -> Self {
        Self::Unset
    }
}

/// Which column an applied filter chip belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKey {
    /// Status column (keyed "tone")
    Tone,
    /// Category column (keyed "type")
    Type,
}

impl FilterKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tone => "tone",
            Self::Type => "type",
        }
    }
}

/// A removable filter chip, e.g. `tone: active, tone: draft`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedFilter {
    pub key: FilterKey,
    pub label: String,
}

/// The filter, sort and query state a view saves
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ViewCriteria {
    pub sort: SortKey,
    pub status_filter: ValueFilter<StatusTag>,
    pub category_filter: ValueFilter<String>,
    pub query: String,
}

impl ViewCriteria {
    /// Create a new criteria builder
    #[must_use]
    pub fn builder() -> ViewCriteriaBuilder {
        ViewCriteriaBuilder::default()
    }

    /// Whether an item passes the status, category and query filters
    ///
    /// The query is a case-insensitive substring match on title or category.
    #[must_use]
    pub fn matches(&self, item: &Item) -> bool {
        if !self.status_filter.allows(&item.status) {
            return false;
        }
        if !self.category_filter.allows(&item.category) {
            return false;
        }
        let query = self.query.trim();
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        item.title.to_lowercase().contains(&query) || item.category.to_lowercase().contains(&query)
    }

    /// Chips for every filter that is set
    #[must_use]
    pub fn applied_filters(&self) -> Vec<AppliedFilter> {
        let mut applied = Vec::new();
        if !self.status_filter.is_unset() {
            applied.push(AppliedFilter {
                key: FilterKey::Tone,
                label: chip_label(FilterKey::Tone, self.status_filter.values().map(|s| s.as_str())),
            });
        }
        if !self.category_filter.is_unset() {
            applied.push(AppliedFilter {
                key: FilterKey::Type,
                label: chip_label(FilterKey::Type, self.category_filter.values().map(String::as_str)),
            });
        }
        applied
    }

    /// Reset both column filters and the query; the sort is kept
    pub fn clear_filters(&mut self) {
        self.status_filter = ValueFilter::Unset;
        self.category_filter = ValueFilter::Unset;
        self.query.clear();
    }
}

fn chip_label<'a>(key: FilterKey, values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|value| format!("{}: {value}", key.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builder for `ViewCriteria`
#[derive(Debug, Clone, Default)]
pub struct ViewCriteriaBuilder {
    sort: Option<SortKey>,
    statuses: Vec<StatusTag>,
    categories: Vec<String>,
    query: String,
}

impl ViewCriteriaBuilder {
    #[must_use]
    pub const fn sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Accept an additional status
    #[must_use]
    pub fn status(mut self, status: StatusTag) -> Self {
        self.statuses.push(status);
        self
    }

    /// Accept an additional category
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    #[must_use]
    pub fn build(self) -> ViewCriteria {
        ViewCriteria {
            sort: self.sort.unwrap_or_default(),
            status_filter: ValueFilter::from_values(self.statuses),
            category_filter: ValueFilter::from_values(self.categories),
            query: self.query,
        }
    }
}

/// A named criteria preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub id: ViewId,
    pub name: String,
    /// Only the default view at index 0 is locked
    pub locked: bool,
    pub criteria: ViewCriteria,
    #[serde(skip)]
    pub(crate) seq: u64,
}

impl View {
    pub(crate) fn new(name: String, seq: u64, locked: bool, criteria: ViewCriteria) -> Self {
        Self {
            id: ViewId::derive(&name, seq),
            name,
            locked,
            criteria,
            seq,
        }
    }

    /// Give the view a new name and remap its id to match
    pub(crate) fn rename(&mut self, name: String) {
        self.id = ViewId::derive(&name, self.seq);
        self.name = name;
    }
}

/// What the "save" button does for the active view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimaryAction {
    /// The locked default view can only be saved as a new view
    SaveAs,
    /// Overwrite the active view's criteria
    Save,
}

impl fmt::Display for ViewCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sort: {} ({})", self.sort.label(), self.sort.direction_label())?;

        let applied = self.applied_filters();
        if applied.is_empty() {
            writeln!(f, "Filters: (none)")?;
        } else {
            for filter in applied {
                writeln!(f, "Filter: {}", filter.label)?;
            }
        }

        if !self.query.is_empty() {
            writeln!(f, "Query: {}", self.query)?;
        }

        Ok(())
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "View: {}{}", self.name, if self.locked { " (locked)" } else { "" })?;
        writeln!(f, "Id: {}", self.id)?;
        write!(f, "{}", self.criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemId;

    fn item(id: u64, title: &str, status: StatusTag, category: &str, description: &str) -> Item {
        Item {
            id: ItemId(id),
            title: title.to_string(),
            price_display: "$1.00".to_string(),
            status,
            inventory_display: "1 in stock".to_string(),
            category: category.to_string(),
            description: description.to_string(),
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_sort_key_values_round_trip() {
        let values: Vec<String> = SortKey::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(values[0], "product asc");
        assert_eq!(values[3], "tone desc");
        assert_eq!(values[7], "description desc");
        for key in SortKey::ALL {
            assert_eq!(key.to_string().parse::<SortKey>().unwrap(), key);
        }
        assert!("price asc".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_sort_key_labels() {
        let status_asc = SortKey::new(SortField::Status, SortDirection::Ascending);
        assert_eq!(status_asc.label(), "Status");
        assert_eq!(status_asc.direction_label(), "A-Z");
        assert_eq!(SortKey::default().direction_label(), "Ascending");
        let type_desc = SortKey::new(SortField::Type, SortDirection::Descending);
        assert_eq!(type_desc.direction_label(), "Z-A");
    }

    #[test]
    fn test_sort_key_compare() {
        let a = item(1, "alpha", StatusTag::Draft, "Hats", "zzz");
        let b = item(2, "Beta", StatusTag::Active, "boots", "aaa");

        let product_asc = SortKey::default();
        assert_eq!(product_asc.compare(&a, &b), Ordering::Less);

        let product_desc = SortKey::new(SortField::Product, SortDirection::Descending);
        assert_eq!(product_desc.compare(&a, &b), Ordering::Greater);

        let status_asc = SortKey::new(SortField::Status, SortDirection::Ascending);
        assert_eq!(status_asc.compare(&a, &b), Ordering::Greater);

        let type_asc = SortKey::new(SortField::Type, SortDirection::Ascending);
        assert_eq!(type_asc.compare(&a, &b), Ordering::Greater);

        let desc_asc = SortKey::new(SortField::Description, SortDirection::Ascending);
        assert_eq!(desc_asc.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_value_filter_from_empty_is_unset() {
        let filter: ValueFilter<String> = ValueFilter::from_values(Vec::new());
        assert!(filter.is_unset());
        assert!(filter.allows(&"anything".to_string()));
    }

    #[test]
    fn test_criteria_matches() {
        let criteria = ViewCriteria::builder()
            .status(StatusTag::Active)
            .category("Shoes")
            .query("RUN")
            .build();

        assert!(criteria.matches(&item(1, "Trail runner", StatusTag::Active, "Shoes", "")));
        assert!(!criteria.matches(&item(2, "Trail runner", StatusTag::Draft, "Shoes", "")));
        assert!(!criteria.matches(&item(3, "Trail runner", StatusTag::Active, "Hats", "")));
        assert!(!criteria.matches(&item(4, "Sandal", StatusTag::Active, "Shoes", "")));
    }

    #[test]
    fn test_applied_filters_labels() {
        let criteria = ViewCriteria::builder()
            .status(StatusTag::Draft)
            .status(StatusTag::Active)
            .category("Shoes")
            .build();

        let applied = criteria.applied_filters();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].key, FilterKey::Tone);
        assert_eq!(applied[0].label, "tone: active, tone: draft");
        assert_eq!(applied[1].label, "type: Shoes");

        assert!(ViewCriteria::default().applied_filters().is_empty());
    }

    #[test]
    fn test_clear_filters_keeps_sort() {
        let sort = SortKey::new(SortField::Type, SortDirection::Descending);
        let mut criteria = ViewCriteria::builder()
            .sort(sort)
            .status(StatusTag::Archived)
            .query("x")
            .build();
        criteria.clear_filters();
        assert_eq!(criteria, ViewCriteria { sort, ..Default::default() });
    }

    #[test]
    fn test_view_rename_remaps_id() {
        let mut view = View::new("Active".to_string(), 3, false, ViewCriteria::default());
        assert_eq!(view.id.as_str(), "Active-3");
        view.rename("Live".to_string());
        assert_eq!(view.id.as_str(), "Live-3");
        assert_eq!(view.name, "Live");
    }

    #[test]
    fn test_view_display() {
        let view = View::new("All".to_string(), 0, true, ViewCriteria::default());
        let text = view.to_string();
        assert!(text.contains("View: All (locked)"));
        assert!(text.contains("Sort: Product (Ascending)"));
        assert!(text.contains("Filters: (none)"));
    }
}
