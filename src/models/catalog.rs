use serde::{Deserialize, Serialize};

pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const BACKDROP_BASE_URL: &str = "https://image.tmdb.org/t/p/original";

/// Fixed genre id → name lookup table, in the vocabulary stored in owned rows
pub const GENRES: &[(u32, &str)] = &[
    (28, "Ação"),
    (12, "Aventura"),
    (16, "Animação"),
    (35, "Comédia"),
    (80, "Crime"),
    (99, "Documentário"),
    (18, "Drama"),
    (10751, "Família"),
    (14, "Fantasia"),
    (36, "História"),
    (27, "Terror"),
    (10402, "Música"),
    (9648, "Mistério"),
    (10749, "Romance"),
    (878, "Ficção científica"),
    (10770, "Cinema TV"),
    (53, "Thriller"),
    (10752, "Guerra"),
    (37, "Faroeste"),
];

pub fn genre_name(id: u32) -> Option<&'static str> {
    GENRES
        .iter()
        .find(|(genre_id, _)| *genre_id == id)
        .map(|(_, name)| *name)
}

/// Maps genre ids to names, dropping unknown ids and repeats
pub fn genre_names(ids: &[u32]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(ids.len());
    for name in ids.iter().filter_map(|id| genre_name(*id)) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Leading year of a `YYYY-MM-DD` release date
pub fn release_year(release_date: Option<&str>) -> Option<i32> {
    release_date
        .and_then(|date| date.get(..4))
        .and_then(|year| year.parse().ok())
}

/// A trending movie as shown on a catalog page; rebuilt on every fetch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogMovie {
    pub external_id: u64,
    pub title: String,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
    pub categories: Vec<String>,
    pub overview: String,
    pub vote_average: f64,
}

/// One page of catalog results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogPage {
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<CatalogMovie>,
}

/// Extended record for the details view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub external_id: u64,
    pub title: String,
    pub overview: String,
    pub tagline: Option<String>,
    pub runtime: Option<u32>,
    pub release_date: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub genres: Vec<String>,
    pub vote_average: f64,
    pub vote_count: u64,
}

impl From<MovieDetails> for CatalogMovie {
    fn from(details: MovieDetails) -> Self {
        CatalogMovie {
            external_id: details.external_id,
            title: details.title,
            year: release_year(details.release_date.as_deref()),
            poster_url: details.poster_url,
            categories: details.genres,
            overview: details.overview,
            vote_average: details.vote_average,
        }
    }
}

// ============================================================================
// Catalog API Types
// ============================================================================

/// Raw movie record from the trending endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub vote_average: f64,
}

impl From<ApiMovie> for CatalogMovie {
    fn from(movie: ApiMovie) -> Self {
        CatalogMovie {
            external_id: movie.id,
            year: release_year(movie.release_date.as_deref()),
            poster_url: movie
                .poster_path
                .map(|path| format!("{}{}", POSTER_BASE_URL, path)),
            categories: genre_names(&movie.genre_ids),
            title: movie.title,
            overview: movie.overview,
            vote_average: movie.vote_average,
        }
    }
}

/// Raw page response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMoviePage {
    #[serde(default = "first_page")]
    pub page: u32,
    pub results: Vec<ApiMovie>,
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

/// Some deployments proxy the catalog and wrap the page in a one-element array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiPageEnvelope {
    Page(ApiMoviePage),
    Wrapped(Vec<ApiMoviePage>),
}

impl ApiPageEnvelope {
    pub fn into_page(self) -> Option<ApiMoviePage> {
        match self {
            ApiPageEnvelope::Page(page) => Some(page),
            ApiPageEnvelope::Wrapped(pages) => pages.into_iter().next(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiGenre {
    #[allow(dead_code)]
    pub id: u32,
    pub name: String,
}

/// Raw response from GET /movie/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<ApiGenre>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
}

impl From<ApiMovieDetails> for MovieDetails {
    fn from(details: ApiMovieDetails) -> Self {
        MovieDetails {
            external_id: details.id,
            title: details.title,
            overview: details.overview,
            tagline: details.tagline.filter(|t| !t.is_empty()),
            runtime: details.runtime,
            release_date: details.release_date.filter(|d| !d.is_empty()),
            poster_url: details
                .poster_path
                .map(|path| format!("{}{}", POSTER_BASE_URL, path)),
            backdrop_url: details
                .backdrop_path
                .map(|path| format!("{}{}", BACKDROP_BASE_URL, path)),
            genres: details.genres.into_iter().map(|g| g.name).collect(),
            vote_average: details.vote_average,
            vote_count: details.vote_count,
        }
    }
}
