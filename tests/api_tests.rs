use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use watchlist_api::{
    api::{create_router, AppState},
    error::{AppError, AppResult},
    models::{
        CatalogMovie, CatalogPage, MovieDetails, NewOwnedMovie, OwnedMovie, OwnedMovieChanges,
        Session, SessionContext, SignUpForm, User,
    },
    services::{
        providers::{AuthProvider, CatalogProvider, OwnedStore},
        CatalogOptions,
    },
};

const TOKEN: &str = "Bearer token-ana";

fn ana() -> User {
    User {
        id: Uuid::from_u128(1),
        email: "ana@example.com".to_string(),
        name: Some("Ana".to_string()),
    }
}

#[derive(Default)]
struct InMemoryStore {
    rows: Mutex<Vec<OwnedMovie>>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::WriteFailed("store unavailable".to_string()));
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl OwnedStore for InMemoryStore {
    async fn create(&self, _session: &SessionContext, movie: NewOwnedMovie) -> AppResult<OwnedMovie> {
        self.check_writable()?;
        let row = OwnedMovie {
            id: Uuid::new_v4(),
            user_id: movie.user_id,
            title: movie.title,
            categories: movie.categories,
            year: movie.year,
            poster_url: movie.poster_url,
            notes: movie.notes,
            watched: movie.watched,
            rating: movie.rating,
            created_at: Some(Utc::now()),
        };
        self.rows.lock().unwrap().insert(0, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        session: &SessionContext,
        id: Uuid,
        changes: OwnedMovieChanges,
    ) -> AppResult<OwnedMovie> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|m| m.id == id && m.user_id == session.user_id())
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))?;
        changes.apply_to(row);
        Ok(row.clone())
    }

    async fn delete(&self, session: &SessionContext, id: Uuid) -> AppResult<()> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|m| !(m.id == id && m.user_id == session.user_id()));
        if rows.len() == before {
            return Err(AppError::NotFound(format!("Movie {} not found", id)));
        }
        Ok(())
    }

    async fn list(&self, session: &SessionContext) -> AppResult<Vec<OwnedMovie>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == session.user_id())
            .cloned()
            .collect())
    }
}

struct FakeAuth;

#[async_trait::async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_up(&self, _form: &SignUpForm) -> AppResult<Option<Session>> {
        Ok(None)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        if email == "ana@example.com" && password == "secret1" {
            Ok(Session {
                access_token: "token-ana".to_string(),
                refresh_token: None,
                expires_in: Some(3600),
                user: ana(),
            })
        } else {
            Err(AppError::Unauthorized("Invalid login credentials".to_string()))
        }
    }

    async fn sign_out(&self, _access_token: &str) -> AppResult<()> {
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> AppResult<Option<User>> {
        Ok((access_token == "token-ana").then(ana))
    }
}

struct FakeCatalog;

fn catalog_movie(id: u64, title: &str, categories: &[&str]) -> CatalogMovie {
    CatalogMovie {
        external_id: id,
        title: title.to_string(),
        year: Some(2023),
        poster_url: None,
        categories: categories.iter().map(|c| c.to_string()).collect(),
        overview: format!("{} overview", title),
        vote_average: 8.0,
    }
}

#[async_trait::async_trait]
impl CatalogProvider for FakeCatalog {
    async fn fetch_page(&self, page: u32, _language: &str) -> AppResult<CatalogPage> {
        let results = match page {
            1 => vec![
                catalog_movie(438631, "Dune", &["Ficção científica"]),
                catalog_movie(872585, "Oppenheimer", &["Drama", "História"]),
            ],
            2 => vec![catalog_movie(346698, "Barbie", &["Comédia"])],
            _ => vec![],
        };
        Ok(CatalogPage {
            page,
            total_pages: 2,
            results,
        })
    }

    async fn fetch_details(&self, external_id: u64, _language: &str) -> AppResult<MovieDetails> {
        match external_id {
            438631 => {}
            603 => return Err(AppError::ExternalApi("TMDB API returned status 503".to_string())),
            _ => return Err(AppError::NotFound(format!("TMDB resource /movie/{} not found", external_id))),
        }
        Ok(MovieDetails {
            external_id,
            title: "Dune".to_string(),
            overview: "Paul Atreides".to_string(),
            tagline: Some("Beyond fear, destiny awaits.".to_string()),
            runtime: Some(155),
            release_date: Some("2021-09-15".to_string()),
            poster_url: None,
            backdrop_url: None,
            genres: vec!["Ficção científica".to_string()],
            vote_average: 7.8,
            vote_count: 12000,
        })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

fn create_test_server() -> (TestServer, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::default());
    let state = AppState::new(
        store.clone(),
        Arc::new(FakeAuth),
        Arc::new(FakeCatalog),
        CatalogOptions {
            language: "pt-BR".to_string(),
            max_pages: 2,
        },
        12,
    );
    let app = create_router(state);
    (TestServer::new(app).unwrap(), store)
}

fn authed(request: TestRequest) -> TestRequest {
    request.add_header(AUTHORIZATION, HeaderValue::from_static(TOKEN))
}

fn titles(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["title"].as_str().unwrap().to_string())
        .collect()
}

async fn add_movie(server: &TestServer, title: &str, categories: &[&str], watched: bool) -> Value {
    let response = authed(server.post("/movies"))
        .json(&json!({
            "title": title,
            "categories": categories,
            "watched": watched
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_request_id_echoed() {
    let (server, _) = create_test_server();
    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("web-123"),
        )
        .await;
    assert_eq!(response.headers().get("x-request-id").unwrap(), "web-123");
}

#[tokio::test]
async fn test_requires_session() {
    let (server, _) = create_test_server();

    server.get("/movies").await.assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/catalog")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer expired"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (server, _) = create_test_server();

    let response = server
        .post("/auth/login")
        .json(&json!({ "email": "ana@example.com", "password": "secret1" }))
        .await;
    response.assert_status_ok();
    let session: Value = response.json();
    assert_eq!(session["access_token"], "token-ana");

    server
        .post("/auth/login")
        .json(&json!({ "email": "ana@example.com", "password": "nope" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let user: Value = authed(server.get("/auth/session")).await.json();
    assert_eq!(user["email"], "ana@example.com");

    authed(server.post("/auth/logout"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_sign_up_validation_and_confirmation() {
    let (server, _) = create_test_server();

    let response = server
        .post("/auth/signup")
        .json(&json!({ "name": "Ana", "email": "ana@", "password": "123" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["fields"]["email"].is_string());
    assert!(body["fields"]["password"].is_string());
    assert!(body["fields"]["accept_terms"].is_string());

    let response = server
        .post("/auth/signup")
        .json(&json!({
            "name": "Ana",
            "email": "ana@example.com",
            "password": "secret1",
            "confirm_password": "secret1",
            "accept_terms": true
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["confirmation_required"], true);
}

#[tokio::test]
async fn test_catalog_reconciliation_scenario() {
    let (server, _) = create_test_server();
    let dune = add_movie(&server, "Dune", &["Ficção científica"], false).await;

    let response = authed(server.get("/catalog")).await;
    response.assert_status_ok();
    let view: Value = response.json();

    assert_eq!(view["total_pages"], 2);
    assert_eq!(titles(&view["items"]), vec!["Dune", "Oppenheimer"]);
    assert_eq!(view["items"][0]["in_owned_list"], true);
    assert_eq!(view["items"][0]["watched"], false);
    assert_eq!(view["items"][0]["owned_id"], dune["id"]);
    assert_eq!(view["items"][1]["in_owned_list"], false);
    assert_eq!(view["items"][1]["watched"], false);
}

#[tokio::test]
async fn test_catalog_search_is_case_insensitive() {
    let (server, _) = create_test_server();

    let view: Value = authed(server.get("/catalog"))
        .add_query_param("search", "dun")
        .await
        .json();
    assert_eq!(titles(&view["items"]), vec!["Dune"]);
}

#[tokio::test]
async fn test_catalog_page_out_of_range() {
    let (server, _) = create_test_server();

    authed(server.get("/catalog"))
        .add_query_param("page", 3)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_creates_then_updates() {
    let (server, store) = create_test_server();

    let response = authed(server.post("/catalog/872585/watched"))
        .json(&json!({ "page": 1 }))
        .await;
    response.assert_status_ok();
    let first: Value = response.json();
    assert_eq!(first["in_owned_list"], true);
    assert_eq!(first["watched"], true);
    assert_eq!(store.len(), 1);

    let view: Value = authed(server.get("/catalog"))
        .add_query_param("watched", "watched")
        .await
        .json();
    assert_eq!(titles(&view["items"]), vec!["Oppenheimer"]);

    let second: Value = authed(server.post("/catalog/872585/watched"))
        .json(&json!({ "page": 1 }))
        .await
        .json();
    assert_eq!(second["watched"], false);
    assert_eq!(second["owned_id"], first["owned_id"]);
    assert_eq!(store.len(), 1);

    let movies: Value = authed(server.get("/movies")).await.json();
    assert_eq!(movies["items"][0]["title"], "Oppenheimer");
    assert_eq!(movies["items"][0]["watched"], false);
    assert_eq!(movies["items"][0]["rating"], 8.0);
    assert_eq!(movies["items"][0]["notes"], "Oppenheimer overview");
}

#[tokio::test]
async fn test_toggle_movie_not_on_page_uses_details() {
    let (server, store) = create_test_server();

    let status: Value = authed(server.post("/catalog/438631/watched"))
        .json(&json!({ "page": 2 }))
        .await
        .json();
    assert_eq!(status["watched"], true);
    assert_eq!(store.rows.lock().unwrap()[0].title, "Dune");

    authed(server.post("/catalog/1/watched"))
        .json(&json!({ "page": 2 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_outage_on_lookup_is_bad_gateway() {
    let (server, store) = create_test_server();

    authed(server.post("/catalog/603/watched"))
        .json(&json!({ "page": 2 }))
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_category_filter_spans_catalog_and_manual_rows() {
    let (server, _) = create_test_server();
    add_movie(&server, "Alien", &["Ficção científica", "Terror"], false).await;
    authed(server.post("/catalog/438631/watched"))
        .json(&json!({ "page": 1 }))
        .await
        .assert_status_ok();

    let page: Value = authed(server.get("/movies"))
        .add_query_param("categories", "Ficção científica")
        .await
        .json();
    assert_eq!(titles(&page["items"]), vec!["Dune", "Alien"]);
}

#[tokio::test]
async fn test_write_failure_leaves_list_unchanged() {
    let (server, store) = create_test_server();
    store.fail_writes.store(true, Ordering::SeqCst);

    authed(server.post("/catalog/872585/watched"))
        .await
        .assert_status(StatusCode::BAD_GATEWAY);

    store.fail_writes.store(false, Ordering::SeqCst);
    let view: Value = authed(server.get("/catalog")).await.json();
    assert_eq!(view["items"][1]["in_owned_list"], false);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_add_to_watchlist_conflict() {
    let (server, store) = create_test_server();

    let response = authed(server.post("/catalog/346698/watchlist"))
        .json(&json!({ "page": 2 }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let owned: Value = response.json();
    assert_eq!(owned["watched"], false);

    authed(server.post("/catalog/346698/watchlist"))
        .json(&json!({ "page": 2 }))
        .await
        .assert_status(StatusCode::CONFLICT);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_details_failure_does_not_fail_request() {
    let (server, _) = create_test_server();

    let found: Value = authed(server.get("/catalog/438631/details")).await.json();
    assert_eq!(found["details"]["runtime"], 155);

    let response = authed(server.get("/catalog/872585/details")).await;
    response.assert_status_ok();
    let missing: Value = response.json();
    assert_eq!(missing["external_id"], 872585);
    assert!(missing["details"].is_null());
}

#[tokio::test]
async fn test_invalid_movie_form() {
    let (server, store) = create_test_server();

    let response = authed(server.post("/movies"))
        .json(&json!({
            "title": "",
            "categories": [],
            "year": 1500,
            "poster_url": "poster.jpg"
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    for field in ["title", "categories", "year", "poster_url"] {
        assert!(body["fields"][field].is_string(), "missing {}", field);
    }
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_owned_list_edit_toggle_delete() {
    let (server, _) = create_test_server();
    let movie = add_movie(&server, "Alien", &["Terror"], false).await;
    let id = movie["id"].as_str().unwrap().to_string();

    let response = authed(server.put(&format!("/movies/{}", id)))
        .json(&json!({
            "title": "Alien",
            "categories": ["Terror", "Ficção científica"],
            "year": 1979,
            "notes": "Director's cut"
        }))
        .await;
    response.assert_status_ok();
    let edited: Value = response.json();
    assert_eq!(edited["year"], 1979);
    assert_eq!(edited["notes"], "Director's cut");

    let toggled: Value = authed(server.patch(&format!("/movies/{}/watched", id)))
        .json(&json!({ "watched": true }))
        .await
        .json();
    assert_eq!(toggled["watched"], true);

    authed(server.delete(&format!("/movies/{}", id)))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    authed(server.delete(&format!("/movies/{}", id)))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let movies: Value = authed(server.get("/movies")).await.json();
    assert_eq!(movies["total_items"], 0);
}

#[tokio::test]
async fn test_owned_list_filters_and_page_reset() {
    let (server, _) = create_test_server();
    add_movie(&server, "Dune", &["Ficção científica"], true).await;
    add_movie(&server, "Dune: Part Two", &["Ficção científica"], false).await;
    add_movie(&server, "Oppenheimer", &["Drama"], true).await;

    // Newest first
    let all: Value = authed(server.get("/movies")).await.json();
    assert_eq!(titles(&all["items"]), vec!["Oppenheimer", "Dune: Part Two", "Dune"]);

    let page: Value = authed(server.get("/movies"))
        .add_query_param("search", "DUNE")
        .add_query_param("page_size", 1)
        .add_query_param("page", 2)
        .await
        .json();
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["page"], 2);
    assert_eq!(titles(&page["items"]), vec!["Dune"]);

    // Narrower filter: page 2 no longer exists, so the view starts over
    let page: Value = authed(server.get("/movies"))
        .add_query_param("categories", "Drama,War")
        .add_query_param("page_size", 1)
        .add_query_param("page", 2)
        .await
        .json();
    assert_eq!(page["page"], 1);
    assert_eq!(titles(&page["items"]), vec!["Oppenheimer"]);

    let page: Value = authed(server.get("/movies"))
        .add_query_param("watched", "unwatched")
        .await
        .json();
    assert_eq!(titles(&page["items"]), vec!["Dune: Part Two"]);
}
