//! External service contracts
//!
//! The owned list, authentication and the movie catalog all live in external
//! services. Each contract is a trait so the HTTP clients can be swapped for
//! in-memory fakes in tests.

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        CatalogPage, MovieDetails, NewOwnedMovie, OwnedMovie, OwnedMovieChanges, Session,
        SessionContext, SignUpForm, User,
    },
};

pub mod supabase;
pub mod tmdb;

/// Row store holding the users' owned lists
///
/// Authorization is enforced by the store per owner; every call carries the
/// caller's session and everything returned belongs to that user.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait OwnedStore: Send + Sync {
    /// Inserts a record and returns it with its store-assigned id
    async fn create(&self, session: &SessionContext, movie: NewOwnedMovie)
        -> AppResult<OwnedMovie>;

    /// Applies a partial update and returns the updated record
    async fn update(
        &self,
        session: &SessionContext,
        id: Uuid,
        changes: OwnedMovieChanges,
    ) -> AppResult<OwnedMovie>;

    async fn delete(&self, session: &SessionContext, id: Uuid) -> AppResult<()>;

    /// All of the owner's records, newest first
    async fn list(&self, session: &SessionContext) -> AppResult<Vec<OwnedMovie>>;
}

/// Authentication provider
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Registers a user. `None` when the provider holds the session back
    /// until the email address is confirmed.
    async fn sign_up(&self, form: &SignUpForm) -> AppResult<Option<Session>>;

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session>;

    async fn sign_out(&self, access_token: &str) -> AppResult<()>;

    /// Resolves a token to its user; `None` for expired or unknown tokens
    async fn current_user(&self, access_token: &str) -> AppResult<Option<User>>;
}

/// Source of trending movies and their details
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn fetch_page(&self, page: u32, language: &str) -> AppResult<CatalogPage>;

    async fn fetch_details(&self, external_id: u64, language: &str) -> AppResult<MovieDetails>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
