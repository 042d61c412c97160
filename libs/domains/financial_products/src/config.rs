use std::time::Duration;

use core_config::{env_or_default, env_parse, ConfigError, FromEnv};
use reqwest::Url;

use crate::error::{ProductError, ProductResult};

pub const DEFAULT_API_URL: &str = "http://localhost:3002";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the remote catalog endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogApiConfig {
    /// Base URL, without the `/bp/products` path
    pub base_url: String,
    pub timeout: Duration,
}

impl CatalogApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Collection URL of the products resource
    pub fn products_url(&self) -> String {
        format!("{}/bp/products", self.base_url)
    }

    /// URL of a single product; `id` is percent-encoded as one path segment
    pub fn product_url(&self, id: &str) -> ProductResult<Url> {
        let mut url = Url::parse(&self.products_url()).map_err(|e| {
            ProductError::transport(format!("Invalid catalog URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ProductError::transport(format!("Catalog URL '{}' cannot have a path", self.base_url))
            })?
            .push(id);
        Ok(url)
    }
}

impl FromEnv for CatalogApiConfig {
    /// Reads:
    /// - CATALOG_API_URL: defaults to http://localhost:3002
    /// - CATALOG_API_TIMEOUT_SECS: defaults to 10
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_or_default("CATALOG_API_URL", DEFAULT_API_URL);
        let timeout_secs: u64 = env_parse("CATALOG_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self::new(base_url).with_timeout(Duration::from_secs(timeout_secs)))
    }
}

impl Default for CatalogApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
