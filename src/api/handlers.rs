use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{
        MovieDetails, MovieForm, OwnedMovie, OwnershipStatus, Session, SessionContext,
        SignInForm, SignUpForm, User, WatchedFilter,
    },
    services::{
        catalog::{self, CatalogView},
        reconcile::Paginated,
        validation,
        watchlist::{self, OwnedListQuery},
    },
};

use super::AppState;

const MAX_PAGE_SIZE: usize = 100;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct MoviesQuery {
    pub search: Option<String>,
    /// Comma-separated category names
    pub categories: Option<String>,
    pub watched: Option<WatchedFilter>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl MoviesQuery {
    fn into_list_query(self, default_page_size: usize) -> OwnedListQuery {
        let categories = self
            .categories
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        OwnedListQuery {
            search: self.search.unwrap_or_default(),
            categories,
            watched: self.watched.unwrap_or_default(),
            page: self.page.unwrap_or(1),
            page_size: self
                .page_size
                .unwrap_or(default_page_size)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub watched: Option<WatchedFilter>,
}

#[derive(Debug, Deserialize)]
pub struct SetWatchedRequest {
    pub watched: bool,
}

/// Identifies the catalog page the client picked the movie from
#[derive(Debug, Default, Deserialize)]
pub struct CatalogActionRequest {
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub session: Option<Session>,
    pub confirmation_required: bool,
}

#[derive(Debug, Serialize)]
pub struct DetailsResponse {
    pub external_id: u64,
    /// `None` when the detail fetch failed; the basic record stays usable
    pub details: Option<MovieDetails>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(form): Json<SignUpForm>,
) -> AppResult<(StatusCode, Json<SignUpResponse>)> {
    validation::validate_sign_up(&form)?;

    let session = state.auth.sign_up(&form).await?;
    let response = SignUpResponse {
        confirmation_required: session.is_none(),
        session,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(form): Json<SignInForm>,
) -> AppResult<Json<Session>> {
    validation::validate_sign_in(&form)?;

    let session = state
        .auth
        .sign_in(form.email.trim(), &form.password)
        .await?;

    tracing::info!(user_id = %session.user.id, "User signed in");

    Ok(Json(session))
}

/// Ends the session; the token is unusable afterwards
pub async fn sign_out(
    State(state): State<AppState>,
    session: SessionContext,
) -> AppResult<StatusCode> {
    state.auth.sign_out(&session.access_token).await?;

    tracing::info!(user_id = %session.user_id(), "User signed out");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_session(session: SessionContext) -> Json<User> {
    Json(session.user)
}

/// Owned list with search, category and watched filters
pub async fn list_movies(
    State(state): State<AppState>,
    session: SessionContext,
    Query(params): Query<MoviesQuery>,
) -> AppResult<Json<Paginated<OwnedMovie>>> {
    let query = params.into_list_query(state.page_size);
    let page = watchlist::list_movies(state.store.as_ref(), &session, &query).await?;
    Ok(Json(page))
}

pub async fn create_movie(
    State(state): State<AppState>,
    session: SessionContext,
    Json(form): Json<MovieForm>,
) -> AppResult<(StatusCode, Json<OwnedMovie>)> {
    let movie = watchlist::create_movie(state.store.as_ref(), &session, form).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
    Json(form): Json<MovieForm>,
) -> AppResult<Json<OwnedMovie>> {
    let movie = watchlist::update_movie(state.store.as_ref(), &session, id, form).await?;
    Ok(Json(movie))
}

pub async fn set_watched(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
    Json(request): Json<SetWatchedRequest>,
) -> AppResult<Json<OwnedMovie>> {
    let movie = watchlist::set_watched(state.store.as_ref(), &session, id, request.watched).await?;
    Ok(Json(movie))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    watchlist::delete_movie(state.store.as_ref(), &session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Trending catalog page reconciled against the caller's owned list
pub async fn browse_catalog(
    State(state): State<AppState>,
    session: SessionContext,
    Query(params): Query<CatalogQuery>,
) -> AppResult<Json<CatalogView>> {
    let view = catalog::browse(
        state.catalog.as_ref(),
        state.store.as_ref(),
        &session,
        &state.catalog_options,
        params.page.unwrap_or(1),
        params.search.as_deref().unwrap_or_default(),
        params.watched.unwrap_or_default(),
    )
    .await?;

    Ok(Json(view))
}

pub async fn catalog_details(
    State(state): State<AppState>,
    _session: SessionContext,
    Path(external_id): Path<u64>,
) -> Json<DetailsResponse> {
    let details =
        catalog::movie_details(state.catalog.as_ref(), &state.catalog_options, external_id).await;

    Json(DetailsResponse {
        external_id,
        details,
    })
}

/// One button for both paths: creates the owned record or flips its watched flag
pub async fn toggle_catalog_watched(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    session: SessionContext,
    Path(external_id): Path<u64>,
    request: Option<Json<CatalogActionRequest>>,
) -> AppResult<Json<OwnershipStatus>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    tracing::info!(
        request_id = %request_id,
        external_id,
        page = request.page,
        "Processing catalog watched toggle"
    );

    let movie = catalog::find_movie(
        state.catalog.as_ref(),
        &state.catalog_options,
        request.page.max(1),
        external_id,
    )
    .await?;

    let status = watchlist::toggle_catalog_watched(state.store.as_ref(), &session, &movie).await?;
    Ok(Json(status))
}

pub async fn add_catalog_to_watchlist(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    session: SessionContext,
    Path(external_id): Path<u64>,
    request: Option<Json<CatalogActionRequest>>,
) -> AppResult<(StatusCode, Json<OwnedMovie>)> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    tracing::info!(
        request_id = %request_id,
        external_id,
        page = request.page,
        "Processing add to watchlist"
    );

    let movie = catalog::find_movie(
        state.catalog.as_ref(),
        &state.catalog_options,
        request.page.max(1),
        external_id,
    )
    .await?;

    let owned = watchlist::add_from_catalog(state.store.as_ref(), &session, &movie).await?;
    Ok((StatusCode::CREATED, Json(owned)))
}
