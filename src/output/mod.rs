//! Output formatting for CLI display
//!
//! This module provides utilities for formatting listings, view tabs,
//! filter chips and description drafts in the terminal.

use crate::items::{BadgeTone, Item, StatusTag};
use crate::views::{AppliedFilter, Projection, View};
use colored::Colorize;

/// Render a status badge in its tone colour
#[must_use]
pub fn status_badge(status: StatusTag) -> String {
    let label = format!("[{status}]");
    match status.tone() {
        BadgeTone::Success => label.green().to_string(),
        BadgeTone::Info => label.cyan().to_string(),
    }
}

/// Format one listing row
#[must_use]
pub fn item_row(item: &Item, quiet: bool) -> String {
    if quiet {
        return item.id.to_string();
    }
    format!(
        "  {:>12}  {}  {} {}  {}  {}",
        item.id.to_string().dimmed(),
        item.title.bold(),
        status_badge(item.status),
        item.price_display,
        item.inventory_display,
        item.category.dimmed(),
    )
}

/// Format a projection, or its empty-state copy
#[must_use]
pub fn projection(projection: &Projection, quiet: bool) -> String {
    if let Some(empty) = projection.empty_state() {
        if quiet {
            return String::new();
        }
        return format!("  {}\n  {}", empty.title.bold(), empty.description.dimmed());
    }

    projection
        .items()
        .iter()
        .map(|item| item_row(item, quiet))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the view tab strip, marking the active view
#[must_use]
pub fn view_tabs(views: &[View], selected: usize) -> String {
    views
        .iter()
        .enumerate()
        .map(|(index, view)| {
            let label = if view.locked {
                format!("{index}: {} (locked)", view.name)
            } else {
                format!("{index}: {}", view.name)
            };
            if index == selected {
                label.reversed().to_string()
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Format applied filter chips
#[must_use]
pub fn filter_chips(filters: &[AppliedFilter]) -> String {
    filters
        .iter()
        .map(|filter| format!("({})", filter.label).yellow().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a description draft for review
#[must_use]
pub fn draft(text: &str) -> String {
    text.lines()
        .map(|line| format!("  │ {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
