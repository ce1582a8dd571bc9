use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated user as known to the auth provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Tokens handed out on sign-in / sign-up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: User,
}

/// Sign-up form as submitted by the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub accept_terms: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// The signed-in user for the duration of one request.
///
/// Established from the bearer token before any owned-list access; every
/// store call is made with this user's token so the store's row-level
/// authorization applies.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub user: User,
    pub access_token: String,
}

impl SessionContext {
    pub fn user_id(&self) -> uuid::Uuid {
        self.user.id
    }
}
