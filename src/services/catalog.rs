use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogMovie, DisplayMovie, MovieDetails, SessionContext, WatchedFilter},
    services::{
        providers::{CatalogProvider, OwnedStore},
        reconcile,
    },
};

/// Catalog settings shared by every catalog call
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub language: String,
    pub max_pages: u32,
}

/// A reconciled, filtered catalog page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogView {
    pub page: u32,
    pub total_pages: u32,
    pub items: Vec<DisplayMovie>,
}

fn check_page(page: u32, options: &CatalogOptions) -> AppResult<()> {
    if page < 1 || page > options.max_pages {
        return Err(AppError::InvalidInput(format!(
            "Page must be between 1 and {}",
            options.max_pages
        )));
    }
    Ok(())
}

/// Fetches a catalog page and decorates it with the caller's ownership status
pub async fn browse(
    catalog: &dyn CatalogProvider,
    store: &dyn OwnedStore,
    session: &SessionContext,
    options: &CatalogOptions,
    page: u32,
    search: &str,
    watched: WatchedFilter,
) -> AppResult<CatalogView> {
    check_page(page, options)?;

    let (catalog_page, owned) = tokio::try_join!(
        catalog.fetch_page(page, &options.language),
        store.list(session),
    )?;

    let display = reconcile::reconcile_page(&catalog_page.results, &owned);
    let items = reconcile::filter(&display, search, watched);

    tracing::info!(
        user_id = %session.user_id(),
        page,
        fetched = catalog_page.results.len(),
        shown = items.len(),
        provider = catalog.name(),
        "Catalog page reconciled"
    );

    Ok(CatalogView {
        page: catalog_page.page,
        total_pages: catalog_page.total_pages,
        items,
    })
}

/// Locates a catalog entry by id on the given page, falling back to its detail record
pub async fn find_movie(
    catalog: &dyn CatalogProvider,
    options: &CatalogOptions,
    page: u32,
    external_id: u64,
) -> AppResult<CatalogMovie> {
    check_page(page, options)?;

    let catalog_page = catalog.fetch_page(page, &options.language).await?;
    if let Some(movie) = catalog_page
        .results
        .into_iter()
        .find(|m| m.external_id == external_id)
    {
        return Ok(movie);
    }

    tracing::debug!(external_id, page, "Movie not on page, using detail record");

    catalog
        .fetch_details(external_id, &options.language)
        .await
        .map(CatalogMovie::from)
        .map_err(|e| match e {
            AppError::NotFound(_) => {
                AppError::NotFound(format!("Movie {} not found in catalog", external_id))
            }
            other => {
                tracing::warn!(external_id, error = %other, "Catalog movie lookup failed");
                other
            }
        })
}

/// Extended record for the details view; a failed fetch yields `None`
pub async fn movie_details(
    catalog: &dyn CatalogProvider,
    options: &CatalogOptions,
    external_id: u64,
) -> Option<MovieDetails> {
    match catalog.fetch_details(external_id, &options.language).await {
        Ok(details) => Some(details),
        Err(e) => {
            tracing::warn!(external_id, error = %e, "Failed to load movie details");
            None
        }
    }
}
