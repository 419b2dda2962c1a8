/// Database configuration and connection management
pub mod database;

/// Catalog seed and config.toml loading
pub mod catalog;

/// Store settings (receipt header, currency, printing)
pub mod store;
