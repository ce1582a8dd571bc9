use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        CatalogMovie, MovieForm, NewOwnedMovie, OwnedMovie, OwnedMovieChanges, OwnershipStatus,
        SessionContext, WatchedFilter,
    },
    services::{
        providers::OwnedStore,
        reconcile::{self, Paginated},
        validation,
    },
};

/// Owned-list view parameters
#[derive(Debug, Clone, Default)]
pub struct OwnedListQuery {
    pub search: String,
    pub categories: Vec<String>,
    pub watched: WatchedFilter,
    pub page: usize,
    pub page_size: usize,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Loads the owned list and applies search, category and watched filters
pub async fn list_movies(
    store: &dyn OwnedStore,
    session: &SessionContext,
    query: &OwnedListQuery,
) -> AppResult<Paginated<OwnedMovie>> {
    let movies = store.list(session).await?;

    let filtered = reconcile::filter(&movies, &query.search, query.watched);
    let filtered = reconcile::filter_by_categories(&filtered, &query.categories);

    tracing::debug!(
        user_id = %session.user_id(),
        total = movies.len(),
        matching = filtered.len(),
        "Owned list filtered"
    );

    Ok(Paginated::build(&filtered, query.page_size, query.page))
}

pub async fn create_movie(
    store: &dyn OwnedStore,
    session: &SessionContext,
    form: MovieForm,
) -> AppResult<OwnedMovie> {
    validation::validate_movie(&form)?;

    let movie = NewOwnedMovie {
        user_id: session.user_id(),
        title: form.title.trim().to_string(),
        categories: form.categories,
        year: form.year,
        poster_url: non_empty(form.poster_url),
        notes: non_empty(form.notes),
        watched: form.watched,
        rating: None,
    };

    store.create(session, movie).await
}

/// Replaces the editable fields of an owned movie
pub async fn update_movie(
    store: &dyn OwnedStore,
    session: &SessionContext,
    id: Uuid,
    form: MovieForm,
) -> AppResult<OwnedMovie> {
    validation::validate_movie(&form)?;

    let changes = OwnedMovieChanges {
        title: Some(form.title.trim().to_string()),
        categories: Some(form.categories),
        year: Some(form.year),
        poster_url: Some(non_empty(form.poster_url)),
        notes: Some(non_empty(form.notes)),
        watched: Some(form.watched),
    };

    store.update(session, id, changes).await
}

pub async fn set_watched(
    store: &dyn OwnedStore,
    session: &SessionContext,
    id: Uuid,
    watched: bool,
) -> AppResult<OwnedMovie> {
    store
        .update(session, id, OwnedMovieChanges::watched(watched))
        .await
}

pub async fn delete_movie(store: &dyn OwnedStore, session: &SessionContext, id: Uuid) -> AppResult<()> {
    store.delete(session, id).await
}

/// Flips the watched flag of a catalog movie, creating the owned record on first use.
///
/// The owned list is reloaded from the store before deciding, so the last
/// confirmed server state wins over whatever the client displayed. Nothing is
/// kept locally: the returned status comes from the record the store confirmed.
pub async fn toggle_catalog_watched(
    store: &dyn OwnedStore,
    session: &SessionContext,
    catalog: &CatalogMovie,
) -> AppResult<OwnershipStatus> {
    let owned = store.list(session).await?;
    let current = reconcile::status(catalog, &owned);

    let confirmed = match current.owned_id {
        Some(id) if current.in_owned_list => {
            store
                .update(session, id, OwnedMovieChanges::watched(!current.watched))
                .await?
        }
        _ => {
            let movie = NewOwnedMovie::from_catalog(session.user_id(), catalog, true);
            store.create(session, movie).await?
        }
    };

    tracing::info!(
        user_id = %session.user_id(),
        external_id = catalog.external_id,
        created = !current.in_owned_list,
        watched = confirmed.watched,
        "Catalog watched status toggled"
    );

    Ok(OwnershipStatus {
        in_owned_list: true,
        watched: confirmed.watched,
        owned_id: Some(confirmed.id),
    })
}

/// Adds a catalog movie to the owned list as unwatched
pub async fn add_from_catalog(
    store: &dyn OwnedStore,
    session: &SessionContext,
    catalog: &CatalogMovie,
) -> AppResult<OwnedMovie> {
    let owned = store.list(session).await?;
    if reconcile::status(catalog, &owned).in_owned_list {
        return Err(AppError::Conflict(format!(
            "\"{}\" is already in your list",
            catalog.title
        )));
    }

    let movie = NewOwnedMovie::from_catalog(session.user_id(), catalog, false);
    store.create(session, movie).await
}
