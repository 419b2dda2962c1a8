//! Catalog configuration loading from config.toml
//!
//! Products listed here are seeded into the database on startup when no product
//! with the same name exists yet, so the file can be edited and re-run safely.

use super::store::StoreConfig;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Store settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Products to seed
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// Configuration for a single product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Display name, also the seeding key
    pub name: String,
    /// Main category
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Optional colour label
    #[serde(default)]
    pub color: Option<String>,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,
    /// Sellable sizes
    #[serde(default)]
    pub sizes: Vec<SizeConfig>,
}

/// Configuration for one size of a product
#[derive(Debug, Deserialize, Clone)]
pub struct SizeConfig {
    /// Size label
    pub size: String,
    /// Opening stock
    pub stock: i32,
    /// Barcode / SKU
    pub sku: String,
}

/// Loads the configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the configuration from `POS_CONFIG`, or ./config.toml when unset.
///
/// A missing file yields the default configuration (default store settings, no
/// products to seed); a file that exists but does not parse is an error.
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("POS_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        tracing::warn!("Config file {path} not found, using defaults");
        return Ok(Config::default());
    }
    load_config(path)
}
