//! crates/research_core/src/themes.rs
//!
//! Read-only views of themes against the current document store.

use crate::domain::Theme;
use crate::store::DocumentStore;

/// How many document names a theme card lists before collapsing the rest.
pub const THEME_PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeOverview {
    pub id: String,
    pub title: String,
    pub description: String,
    pub document_count: usize,
    /// Up to [`THEME_PREVIEW_LIMIT`] names. Dangling ids show as "Unknown Document".
    pub preview_names: Vec<String>,
    pub remaining: usize,
    /// Share of the store's documents this theme mentions, rounded to a whole percent.
    pub coverage_percent: u32,
}

pub fn overview(theme: &Theme, store: &DocumentStore) -> ThemeOverview {
    let document_count = theme.document_ids.len();
    let preview_names = theme
        .document_ids
        .iter()
        .take(THEME_PREVIEW_LIMIT)
        .map(|id| store.document_name(id).to_string())
        .collect();

    let coverage_percent = if store.is_empty() {
        0
    } else {
        ((document_count as f64 / store.len() as f64) * 100.0).round() as u32
    };

    ThemeOverview {
        id: theme.id.clone(),
        title: theme.title.clone(),
        description: theme.description.clone(),
        document_count,
        preview_names,
        remaining: document_count.saturating_sub(THEME_PREVIEW_LIMIT),
        coverage_percent,
    }
}
