use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the hosted backend (auth + REST row store)
    pub backend_url: String,

    /// Public (anon) key sent as `apikey` on every backend call
    pub backend_anon_key: String,

    /// Bearer token for the movie catalog API
    pub catalog_api_token: String,

    /// Movie catalog API base URL
    #[serde(default = "default_catalog_api_url")]
    pub catalog_api_url: String,

    /// Language requested from the catalog (titles, overviews)
    #[serde(default = "default_catalog_language")]
    pub catalog_language: String,

    /// Highest catalog page the API will serve
    #[serde(default = "default_max_catalog_pages")]
    pub max_catalog_pages: u32,

    /// Owned-list page size when the client does not ask for one
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_catalog_language() -> String {
    "pt-BR".to_string()
}

fn default_max_catalog_pages() -> u32 {
    500
}

fn default_page_size() -> usize {
    12
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
