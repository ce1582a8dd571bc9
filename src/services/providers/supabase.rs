//! Hosted backend provider (Supabase)
//!
//! Serves two contracts from one project:
//! - Auth (`/auth/v1/*`): sign-up, password sign-in, logout, token → user
//! - Row store (`/rest/v1/movies`): PostgREST endpoints over the owned list
//!
//! Every call sends the project's anon key as `apikey`; store and user calls
//! add the user's access token so row-level security scopes rows to the owner.

use crate::{
    error::{AppError, AppResult},
    models::{
        NewOwnedMovie, OwnedMovie, OwnedMovieChanges, Session, SessionContext, SignUpForm, User,
    },
    services::providers::{AuthProvider, OwnedStore},
};
use chrono::{DateTime, Utc};
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

const MOVIES_TABLE: &str = "movies";

#[derive(Clone)]
pub struct SupabaseClient {
    http_client: HttpClient,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
}

impl From<ApiUser> for User {
    fn from(user: ApiUser) -> Self {
        User {
            id: user.id,
            email: user.email.unwrap_or_default(),
            name: user
                .user_metadata
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiSession {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    user: ApiUser,
}

impl From<ApiSession> for Session {
    fn from(session: ApiSession) -> Self {
        Session {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
            user: session.user.into(),
        }
    }
}

/// Sign-up answers with a session, or only the user while email confirmation is pending
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiSignUp {
    Session(ApiSession),
    PendingConfirmation(ApiUser),
}

/// Row of the `movies` table as PostgREST returns it
#[derive(Debug, Deserialize)]
struct MovieRow {
    id: Uuid,
    user_id: Uuid,
    titulo: String,
    #[serde(default)]
    categorias: Option<Vec<String>>,
    #[serde(default)]
    ano: Option<i32>,
    #[serde(default)]
    poster_url: Option<String>,
    #[serde(default)]
    observacoes: Option<String>,
    #[serde(default)]
    assistido: Option<bool>,
    #[serde(default)]
    nota: Option<f64>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<MovieRow> for OwnedMovie {
    fn from(row: MovieRow) -> Self {
        OwnedMovie {
            id: row.id,
            user_id: row.user_id,
            title: row.titulo,
            categories: row.categorias.unwrap_or_default(),
            year: row.ano,
            poster_url: row.poster_url,
            notes: row.observacoes,
            watched: row.assistido.unwrap_or(false),
            rating: row.nota,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct MovieInsert<'a> {
    user_id: Uuid,
    titulo: &'a str,
    categorias: &'a [String],
    ano: Option<i32>,
    poster_url: Option<&'a str>,
    observacoes: Option<&'a str>,
    assistido: bool,
    nota: Option<f64>,
}

impl<'a> From<&'a NewOwnedMovie> for MovieInsert<'a> {
    fn from(movie: &'a NewOwnedMovie) -> Self {
        MovieInsert {
            user_id: movie.user_id,
            titulo: &movie.title,
            categorias: &movie.categories,
            ano: movie.year,
            poster_url: movie.poster_url.as_deref(),
            observacoes: movie.notes.as_deref(),
            assistido: movie.watched,
            nota: movie.rating,
        }
    }
}

/// PATCH body; only the columns being changed are sent
#[derive(Debug, Serialize)]
struct MoviePatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    titulo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    categorias: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ano: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    poster_url: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    observacoes: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assistido: Option<bool>,
}

impl<'a> From<&'a OwnedMovieChanges> for MoviePatch<'a> {
    fn from(changes: &'a OwnedMovieChanges) -> Self {
        MoviePatch {
            titulo: changes.title.as_deref(),
            categorias: changes.categories.as_deref(),
            ano: changes.year,
            poster_url: changes.poster_url.as_ref().map(Option::as_deref),
            observacoes: changes.notes.as_ref().map(Option::as_deref),
            assistido: changes.watched,
        }
    }
}

/// Pulls the human-readable message out of an auth/PostgREST error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

impl SupabaseClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, MOVIES_TABLE)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn with_user(&self, builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    /// Sends a store write; any failure becomes `WriteFailed` so callers leave state untouched
    async fn send_write(&self, builder: RequestBuilder, action: &str) -> AppResult<Vec<OwnedMovie>> {
        let response = builder
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| AppError::WriteFailed(format!("{} failed: {}", action, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, action, "Owned store rejected write");
            return Err(AppError::WriteFailed(format!(
                "{} rejected with status {}: {}",
                action,
                status,
                error_message(&body)
            )));
        }

        let rows: Vec<MovieRow> = response
            .json()
            .await
            .map_err(|e| AppError::WriteFailed(format!("{} returned malformed rows: {}", action, e)))?;

        Ok(rows.into_iter().map(OwnedMovie::from).collect())
    }

    async fn check_auth(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AppError::Unauthorized(message))
            }
            StatusCode::UNPROCESSABLE_ENTITY => Err(AppError::InvalidInput(message)),
            _ => Err(AppError::ExternalApi(format!(
                "Auth API returned status {}: {}",
                status, message
            ))),
        }
    }
}

#[async_trait::async_trait]
impl OwnedStore for SupabaseClient {
    async fn create(
        &self,
        session: &SessionContext,
        movie: NewOwnedMovie,
    ) -> AppResult<OwnedMovie> {
        let builder = self
            .with_user(self.http_client.post(self.table_url()), &session.access_token)
            .json(&[MovieInsert::from(&movie)]);

        let created = self
            .send_write(builder, "insert")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::WriteFailed("insert returned no row".to_string()))?;

        tracing::info!(user_id = %session.user_id(), movie_id = %created.id, "Owned movie created");

        Ok(created)
    }

    async fn update(
        &self,
        session: &SessionContext,
        id: Uuid,
        changes: OwnedMovieChanges,
    ) -> AppResult<OwnedMovie> {
        let builder = self
            .with_user(self.http_client.patch(self.table_url()), &session.access_token)
            .query(&[("id", format!("eq.{}", id))])
            .json(&MoviePatch::from(&changes));

        let updated = self
            .send_write(builder, "update")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))?;

        tracing::info!(user_id = %session.user_id(), movie_id = %id, "Owned movie updated");

        Ok(updated)
    }

    async fn delete(&self, session: &SessionContext, id: Uuid) -> AppResult<()> {
        let builder = self
            .with_user(self.http_client.delete(self.table_url()), &session.access_token)
            .query(&[("id", format!("eq.{}", id))]);

        let deleted = self.send_write(builder, "delete").await?;
        if deleted.is_empty() {
            return Err(AppError::NotFound(format!("Movie {} not found", id)));
        }

        tracing::info!(user_id = %session.user_id(), movie_id = %id, "Owned movie deleted");

        Ok(())
    }

    async fn list(&self, session: &SessionContext) -> AppResult<Vec<OwnedMovie>> {
        let response = self
            .with_user(self.http_client.get(self.table_url()), &session.access_token)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", session.user_id())),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Owned store returned status {}: {}",
                status,
                error_message(&body)
            )));
        }

        let rows: Vec<MovieRow> = response.json().await?;
        let movies: Vec<OwnedMovie> = rows.into_iter().map(OwnedMovie::from).collect();

        tracing::debug!(user_id = %session.user_id(), count = movies.len(), "Owned list loaded");

        Ok(movies)
    }
}

#[async_trait::async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_up(&self, form: &SignUpForm) -> AppResult<Option<Session>> {
        let response = self
            .http_client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "email": form.email.trim(),
                "password": form.password,
                "data": { "name": form.name.trim() },
            }))
            .send()
            .await?;

        let response = Self::check_auth(response).await?;
        match response.json::<ApiSignUp>().await? {
            ApiSignUp::Session(session) => Ok(Some(session.into())),
            ApiSignUp::PendingConfirmation(user) => {
                tracing::info!(user_id = %user.id, "Sign-up pending email confirmation");
                Ok(None)
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let response = self
            .http_client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let session: ApiSession = Self::check_auth(response).await?.json().await?;
        Ok(session.into())
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .with_user(self.http_client.post(self.auth_url("logout")), access_token)
            .send()
            .await?;

        Self::check_auth(response).await?;
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> AppResult<Option<User>> {
        let response = self
            .with_user(self.http_client.get(self.auth_url("user")), access_token)
            .send()
            .await?;

        match Self::check_auth(response).await {
            Ok(response) => {
                let user: ApiUser = response.json().await?;
                Ok(Some(user.into()))
            }
            Err(AppError::Unauthorized(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
