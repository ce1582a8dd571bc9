//! Reconciliation of catalog entries against the owned list, plus the row
//! filters and pagination shared by the catalog and owned-list views.
//!
//! Two movies are the same iff their titles are equal as strings
//! (case-sensitive, no normalization). Titles that differ only in accents,
//! case or punctuation therefore do not match, and two different movies
//! sharing a title collide; when several owned records share the title, the
//! first one in list order wins.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{CatalogMovie, DisplayMovie, OwnedMovie, OwnershipStatus, WatchedFilter};

/// Row shape the list filters operate on
pub trait Listing {
    fn title(&self) -> &str;
    fn categories(&self) -> &[String];
    fn is_watched(&self) -> bool;
}

impl Listing for OwnedMovie {
    fn title(&self) -> &str {
        &self.title
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }

    fn is_watched(&self) -> bool {
        self.watched
    }
}

impl Listing for DisplayMovie {
    fn title(&self) -> &str {
        &self.movie.title
    }

    fn categories(&self) -> &[String] {
        &self.movie.categories
    }

    fn is_watched(&self) -> bool {
        self.status.watched
    }
}

fn status_of(owned: &OwnedMovie) -> OwnershipStatus {
    OwnershipStatus {
        in_owned_list: true,
        watched: owned.watched,
        owned_id: Some(owned.id),
    }
}

/// Ownership status of a catalog entry by linear scan of the owned list
pub fn status(catalog: &CatalogMovie, owned: &[OwnedMovie]) -> OwnershipStatus {
    owned
        .iter()
        .find(|m| m.title == catalog.title)
        .map(status_of)
        .unwrap_or_default()
}

pub fn to_display(catalog: &CatalogMovie, owned: &[OwnedMovie]) -> DisplayMovie {
    DisplayMovie {
        movie: catalog.clone(),
        status: status(catalog, owned),
    }
}

/// Owned list keyed by title, built once per owned-list load.
///
/// Answers exactly like [`status`] without rescanning the list per entry.
pub struct OwnedIndex<'a> {
    by_title: HashMap<&'a str, &'a OwnedMovie>,
}

impl<'a> OwnedIndex<'a> {
    pub fn new(owned: &'a [OwnedMovie]) -> Self {
        let mut by_title = HashMap::new();
        for movie in owned {
            // First record with a title wins
            by_title.entry(movie.title.as_str()).or_insert(movie);
        }
        Self { by_title }
    }

    pub fn status(&self, catalog: &CatalogMovie) -> OwnershipStatus {
        self.by_title
            .get(catalog.title.as_str())
            .copied()
            .map(status_of)
            .unwrap_or_default()
    }

    pub fn to_display(&self, catalog: &CatalogMovie) -> DisplayMovie {
        DisplayMovie {
            movie: catalog.clone(),
            status: self.status(catalog),
        }
    }
}

/// Decorates a whole catalog page against the owned list
pub fn reconcile_page(catalog: &[CatalogMovie], owned: &[OwnedMovie]) -> Vec<DisplayMovie> {
    let index = OwnedIndex::new(owned);
    catalog.iter().map(|movie| index.to_display(movie)).collect()
}

/// Case-insensitive substring match on the trimmed search term
pub fn matches_search<T: Listing>(item: &T, search: &str) -> bool {
    let needle = search.trim();
    needle.is_empty() || item.title().to_lowercase().contains(&needle.to_lowercase())
}

/// Keeps items matching the search term and the watched filter, in input order
pub fn filter<T: Listing + Clone>(items: &[T], search: &str, watched: WatchedFilter) -> Vec<T> {
    items
        .iter()
        .filter(|item| matches_search(*item, search))
        .filter(|item| watched.accepts(item.is_watched()))
        .cloned()
        .collect()
}

/// Keeps items tagged with at least one selected category; no selection keeps all
pub fn filter_by_categories<T: Listing + Clone>(items: &[T], selected: &[String]) -> Vec<T> {
    if selected.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|item| selected.iter().any(|c| item.categories().contains(c)))
        .cloned()
        .collect()
}

/// The contiguous slice `[(page-1)*size, page*size)`, clamped to the input.
///
/// Pages are 1-based; page 0 is read as page 1.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    let page = page.max(1);
    let start = page_size.saturating_mul(page - 1).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// A page of a filtered list together with its totals
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T: Clone> Paginated<T> {
    /// Slices `items`; a requested page past the end of the set resets to page 1
    pub fn build(items: &[T], page_size: usize, requested_page: usize) -> Self {
        let total_pages = total_pages(items.len(), page_size);
        let page = if requested_page < 1 || requested_page > total_pages {
            1
        } else {
            requested_page
        };

        Self {
            items: paginate(items, page_size, page).to_vec(),
            page,
            page_size,
            total_items: items.len(),
            total_pages,
        }
    }
}
