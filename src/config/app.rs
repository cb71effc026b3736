//! Application configuration loading from config.toml
//!
//! The file holds the pricing policy (`[pricing]`) and the catalog used to seed an
//! empty store (`[catalog]`). Both tables are optional.

use crate::{
    config::{catalog::CatalogSeed, pricing::PricingSettings},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Pricing policy
    #[serde(default)]
    pub pricing: PricingSettings,
    /// Catalog seed tables
    #[serde(default)]
    pub catalog: CatalogSeed,
}

/// Loads the application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A family tag or required field is missing or unknown
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
///
/// # Errors
/// Returns `Error::Config` if the TOML is invalid.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from `CONFIG_PATH`, or ./config.toml when unset
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}
