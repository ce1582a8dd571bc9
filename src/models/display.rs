use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CatalogMovie;

/// Ownership of a catalog entry, derived from the current owned list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnershipStatus {
    pub in_owned_list: bool,
    pub watched: bool,
    pub owned_id: Option<Uuid>,
}

/// A catalog entry decorated with its ownership status; always a projection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayMovie {
    #[serde(flatten)]
    pub movie: CatalogMovie,
    #[serde(flatten)]
    pub status: OwnershipStatus,
}

/// Watched-status predicate for list views
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WatchedFilter {
    #[default]
    All,
    Watched,
    Unwatched,
}

impl WatchedFilter {
    /// Whether an item with the given watched flag passes
    pub fn accepts(self, watched: bool) -> bool {
        match self {
            WatchedFilter::All => true,
            WatchedFilter::Watched => watched,
            WatchedFilter::Unwatched => !watched,
        }
    }
}
