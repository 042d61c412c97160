//! Configuration for the catalog CLI

use core_config::{env_parse, ConfigError, Environment, FromEnv};
use domain_financial_products::{CatalogApiConfig, DEFAULT_ITEMS_PER_PAGE, ITEMS_PER_PAGE_OPTIONS};

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub api: CatalogApiConfig,
    /// Initial page size, one of the offered choices
    pub page_size: usize,
}

impl Config {
    /// Reads `APP_ENV`, the catalog API settings and `CATALOG_PAGE_SIZE`
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let api = CatalogApiConfig::from_env()?;
        let page_size = parse_page_size_env()?;

        Ok(Self {
            environment,
            api,
            page_size,
        })
    }
}

fn parse_page_size_env() -> Result<usize, ConfigError> {
    let page_size = env_parse("CATALOG_PAGE_SIZE", DEFAULT_ITEMS_PER_PAGE)?;
    if !ITEMS_PER_PAGE_OPTIONS.contains(&page_size) {
        return Err(ConfigError::ParseError {
            key: "CATALOG_PAGE_SIZE".to_string(),
            details: format!("{} is not one of {:?}", page_size, ITEMS_PER_PAGE_OPTIONS),
        });
    }
    Ok(page_size)
}

/// clap value parser for `--per-page`
pub fn parse_page_size(raw: &str) -> Result<usize, String> {
    let size: usize = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if ITEMS_PER_PAGE_OPTIONS.contains(&size) {
        Ok(size)
    } else {
        Err(format!("page size must be one of {:?}", ITEMS_PER_PAGE_OPTIONS))
    }
}
