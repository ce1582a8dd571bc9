//! Movie catalog provider backed by The Movie Database (TMDB) v3 API
//!
//! API Flow:
//! 1. Catalog page: /trending/movie/week?page=N → raw movies with genre ids
//! 2. Details: /movie/{id} → runtime, tagline, backdrop, vote count
//!
//! Both endpoints authenticate with a v4 read access token sent as a bearer.

use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::{ApiMovieDetails, ApiPageEnvelope},
        CatalogMovie, CatalogPage, MovieDetails,
    },
    services::providers::CatalogProvider,
};
use reqwest::{Client as HttpClient, Response, StatusCode};

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_url: String,
    api_token: String,
    max_pages: u32,
}

impl TmdbProvider {
    pub fn new(api_url: String, api_token: String, max_pages: u32) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token,
            max_pages,
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> AppResult<Response> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .header("accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("TMDB resource {} not found", path)));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn fetch_page(&self, page: u32, language: &str) -> AppResult<CatalogPage> {
        let response = self
            .get(
                "/trending/movie/week",
                &[("language", language.to_string()), ("page", page.to_string())],
            )
            .await?;

        let envelope: ApiPageEnvelope = response.json().await.map_err(|e| {
            tracing::error!(error = %e, page, "Failed to deserialize TMDB page");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })?;

        let raw = envelope
            .into_page()
            .ok_or_else(|| AppError::ExternalApi("Empty TMDB page response".to_string()))?;

        let catalog_page = CatalogPage {
            page: raw.page,
            total_pages: raw.total_pages.min(self.max_pages),
            results: raw.results.into_iter().map(CatalogMovie::from).collect(),
        };

        tracing::info!(
            page,
            results = catalog_page.results.len(),
            total_pages = catalog_page.total_pages,
            provider = self.name(),
            "Catalog page fetched"
        );

        Ok(catalog_page)
    }

    async fn fetch_details(&self, external_id: u64, language: &str) -> AppResult<MovieDetails> {
        let response = self
            .get(
                &format!("/movie/{}", external_id),
                &[("language", language.to_string())],
            )
            .await?;

        let details: ApiMovieDetails = response.json().await.map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse TMDB details: {}", e))
        })?;

        tracing::debug!(external_id, provider = self.name(), "Movie details fetched");

        Ok(details.into())
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
