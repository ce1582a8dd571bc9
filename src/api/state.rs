use std::sync::Arc;

use crate::{
    config::Config,
    services::{
        providers::{
            supabase::SupabaseClient, tmdb::TmdbProvider, AuthProvider, CatalogProvider,
            OwnedStore,
        },
        CatalogOptions,
    },
};

/// Shared application state
///
/// Holds only handles to the external services; no user data is cached
/// between requests, so every view is computed from freshly loaded rows.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OwnedStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub catalog_options: CatalogOptions,
    /// Owned-list page size when the request does not set one
    pub page_size: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn OwnedStore>,
        auth: Arc<dyn AuthProvider>,
        catalog: Arc<dyn CatalogProvider>,
        catalog_options: CatalogOptions,
        page_size: usize,
    ) -> Self {
        Self {
            store,
            auth,
            catalog,
            catalog_options,
            page_size,
        }
    }

    /// Wires the HTTP providers described by the configuration
    pub fn from_config(config: &Config) -> Self {
        let backend = Arc::new(SupabaseClient::new(
            config.backend_url.clone(),
            config.backend_anon_key.clone(),
        ));
        let catalog = Arc::new(TmdbProvider::new(
            config.catalog_api_url.clone(),
            config.catalog_api_token.clone(),
            config.max_catalog_pages,
        ));

        Self::new(
            backend.clone(),
            backend,
            catalog,
            CatalogOptions {
                language: config.catalog_language.clone(),
                max_pages: config.max_catalog_pages,
            },
            config.page_size,
        )
    }
}
