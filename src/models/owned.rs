use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CatalogMovie;

/// A movie saved in the user's personal list
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OwnedMovie {
    /// Identifier assigned by the store
    pub id: Uuid,
    pub user_id: Uuid,
    /// Matching key against catalog entries
    pub title: String,
    pub categories: Vec<String>,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
    pub notes: Option<String>,
    pub watched: bool,
    pub rating: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new owned movie
#[derive(Debug, Clone, PartialEq)]
pub struct NewOwnedMovie {
    pub user_id: Uuid,
    pub title: String,
    pub categories: Vec<String>,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
    pub notes: Option<String>,
    pub watched: bool,
    pub rating: Option<f64>,
}

impl NewOwnedMovie {
    /// Copies a catalog entry into an insert payload; the overview becomes the notes
    pub fn from_catalog(user_id: Uuid, movie: &CatalogMovie, watched: bool) -> Self {
        Self {
            user_id,
            title: movie.title.clone(),
            categories: movie.categories.clone(),
            year: movie.year,
            poster_url: movie.poster_url.clone(),
            notes: Some(movie.overview.clone()).filter(|o| !o.is_empty()),
            watched,
            rating: Some(movie.vote_average),
        }
    }
}

/// Partial update; `None` leaves a field untouched, `Some(None)` clears it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnedMovieChanges {
    pub title: Option<String>,
    pub categories: Option<Vec<String>>,
    pub year: Option<Option<i32>>,
    pub poster_url: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub watched: Option<bool>,
}

impl OwnedMovieChanges {
    pub fn watched(watched: bool) -> Self {
        Self {
            watched: Some(watched),
            ..Default::default()
        }
    }

    /// Applies the set fields onto a stored record
    pub fn apply_to(&self, movie: &mut OwnedMovie) {
        if let Some(title) = &self.title {
            movie.title = title.clone();
        }
        if let Some(categories) = &self.categories {
            movie.categories = categories.clone();
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(poster_url) = &self.poster_url {
            movie.poster_url = poster_url.clone();
        }
        if let Some(notes) = &self.notes {
            movie.notes = notes.clone();
        }
        if let Some(watched) = self.watched {
            movie.watched = watched;
        }
    }
}

/// Add/edit form as submitted by the client, validated before any write
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub watched: bool,
}
