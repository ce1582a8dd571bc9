use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/auth/signup", post(handlers::sign_up))
        .route("/auth/login", post(handlers::sign_in))
        .route("/auth/logout", post(handlers::sign_out))
        .route("/auth/session", get(handlers::get_session))
        // Owned list
        .route(
            "/movies",
            get(handlers::list_movies).post(handlers::create_movie),
        )
        .route(
            "/movies/:id",
            put(handlers::update_movie).delete(handlers::delete_movie),
        )
        .route("/movies/:id/watched", patch(handlers::set_watched))
        // Catalog
        .route("/catalog", get(handlers::browse_catalog))
        .route("/catalog/:external_id/details", get(handlers::catalog_details))
        .route(
            "/catalog/:external_id/watched",
            post(handlers::toggle_catalog_watched),
        )
        .route(
            "/catalog/:external_id/watchlist",
            post(handlers::add_catalog_to_watchlist),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}
