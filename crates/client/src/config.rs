//! Client configuration loaded from environment variables.

use entity_store::StoreConfig;

/// Client configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `API_URL`: base URL of the API (default: `"http://localhost:5000"`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `API_TOKEN`: token seeded into the store at start (default: none)
/// - `API_TOKEN_TYPE`: slot the token is stored under (default: `"user"`)
/// - `STORE_COLLECTIONS`: comma-separated collection names (default: the built-in list)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub log_level: String,
    pub token: Option<String>,
    pub token_type: String,
    pub store: StoreConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            api_url: non_empty("API_URL").unwrap_or(defaults.api_url),
            log_level: non_empty("RUST_LOG").unwrap_or(defaults.log_level),
            token: non_empty("API_TOKEN"),
            token_type: non_empty("API_TOKEN_TYPE").unwrap_or(defaults.token_type),
            store: non_empty("STORE_COLLECTIONS")
                .map(|list| StoreConfig::from_list(&list))
                .unwrap_or(defaults.store),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            log_level: "info".to_string(),
            token: None,
            token_type: "user".to_string(),
            store: StoreConfig::default(),
        }
    }
}
