//! Store settings from the `[store]` table of config.toml.
//!
//! Every field has a default so a config file without a `[store]` table (or no
//! config file at all) still produces a working register.

use serde::Deserialize;
use std::path::PathBuf;

/// Settings that shape receipts and stock reporting
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// Printed at the top of every receipt
    pub name: String,
    /// Currency label printed before the total (e.g., "Rs.")
    pub currency: String,
    /// Directory receipts are written into
    pub receipt_dir: PathBuf,
    /// Program invoked with the receipt path to print it (e.g., "lp")
    pub print_command: Option<String>,
    /// Sizes at or below this stock level are reported as low stock
    pub low_stock_threshold: i32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "SHOE MART".to_string(),
            currency: "Rs.".to_string(),
            receipt_dir: PathBuf::from("Receipts"),
            print_command: None,
            low_stock_threshold: 5,
        }
    }
}
