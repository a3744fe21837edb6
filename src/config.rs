//! Client configuration.

use crate::cache::CachePolicy;
use crate::error::FetchError;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_INDEX_PATH: &str = "pokemon";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONCURRENCY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, e.g. `https://pokeapi.co/api/v2`.
    pub base_url: String,
    /// Resource path of the index endpoint under `base_url`.
    pub index_path: String,
    /// Per-request timeout applied by the HTTP transport.
    pub timeout: Duration,
    /// Maximum number of detail requests in flight. `None` is unbounded.
    pub concurrency: Option<usize>,
    pub cache: CachePolicy,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            index_path: DEFAULT_INDEX_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            concurrency: Some(DEFAULT_CONCURRENCY),
            cache: CachePolicy::Unbounded,
            user_agent: format!("pokedex-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.base_url.trim().is_empty() {
            return Err(FetchError::Config("base URL is empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(FetchError::Config("timeout must be non-zero".to_string()));
        }
        if self.concurrency == Some(0) {
            return Err(FetchError::Config(
                "concurrency limit must be at least 1".to_string(),
            ));
        }
        if let Some(0) = self.cache.capacity() {
            return Err(FetchError::Config(
                "cache capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `<base_url>/<index_path>?limit=<limit>`
    pub fn index_url(&self, limit: usize) -> String {
        format!(
            "{}/{}?limit={}",
            self.base_url.trim_end_matches('/'),
            self.index_path.trim_matches('/'),
            limit
        )
    }
}
