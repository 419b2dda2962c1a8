//! Receipt emission - Post-commit, best-effort output of a sale.
//!
//! A [`Receipt`] is built only from a committed [`PlacedOrder`], never from the cart,
//! so emitting it (once or many times) cannot change what was sold. Emitters report
//! failures as errors; the register turns them into warnings because the order
//! already stands.

use super::checkout::PlacedOrder;
use crate::{
    config::store::StoreConfig,
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Width of an 80 mm thermal roll in characters.
const RECEIPT_WIDTH: usize = 32;

/// One printed line item.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    /// Product name at time of sale
    pub product_name: String,
    /// Size label at time of sale
    pub size_value: String,
    /// Units sold
    pub quantity: i32,
    /// Unit price
    pub price: f64,
    /// `price * quantity`
    pub line_total: f64,
}

/// Everything printed on a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    /// Store name header
    pub store_name: String,
    /// Currency label for the total
    pub currency: String,
    /// Order the receipt belongs to
    pub order_id: i64,
    /// Customer name, may be empty
    pub customer_name: String,
    /// When the order was committed
    pub created_at: DateTime<Utc>,
    /// Items in order
    pub lines: Vec<ReceiptLine>,
    /// Order total
    pub total: f64,
}

impl Receipt {
    /// Builds a receipt from a committed order.
    #[must_use]
    pub fn from_order(store: &StoreConfig, placed: &PlacedOrder) -> Self {
        Self {
            store_name: store.name.clone(),
            currency: store.currency.clone(),
            order_id: placed.order.id,
            customer_name: placed.order.customer_name.clone(),
            created_at: placed.order.created_at,
            lines: placed
                .items
                .iter()
                .map(|item| ReceiptLine {
                    product_name: item.product_name.clone(),
                    size_value: item.size_value.clone(),
                    quantity: item.quantity,
                    price: item.price,
                    line_total: item.line_total,
                })
                .collect(),
            total: placed.order.total,
        }
    }

    /// Plain-text rendering for a thermal printer.
    #[must_use]
    pub fn render(&self) -> String {
        let rule = "-".repeat(RECEIPT_WIDTH);
        let mut lines = vec![
            format!("{:^RECEIPT_WIDTH$}", self.store_name),
            format!("{:^RECEIPT_WIDTH$}", "SALES RECEIPT"),
            format!(
                "{:^RECEIPT_WIDTH$}",
                format!("Date: {}", self.created_at.format("%Y-%m-%d %H:%M"))
            ),
            format!("{:^RECEIPT_WIDTH$}", format!("Order #{}", self.order_id)),
        ];
        if !self.customer_name.is_empty() {
            lines.push(format!("Customer: {}", self.customer_name));
        }
        lines.push(rule.clone());

        for line in &self.lines {
            lines.push(format!("{} ({})", line.product_name, line.size_value));
            lines.push(format!(
                " {} x {:.2}  =  {:.2}",
                line.quantity, line.price, line.line_total
            ));
        }

        lines.push(rule);
        lines.push(format!(
            "{:>RECEIPT_WIDTH$}",
            format!("TOTAL: {} {:.2}", self.currency, self.total)
        ));
        lines.push(String::new());
        lines.push(format!("{:^RECEIPT_WIDTH$}", "Thank you!"));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Output side of a sale. Called only after the order transaction committed.
pub trait ReceiptEmitter {
    /// Produces the receipt artifact and any print side effect.
    fn emit(&self, receipt: &Receipt) -> Result<()>;
}

/// Writes receipts as text files and optionally hands them to a print command.
#[derive(Debug, Clone)]
pub struct FileReceiptEmitter {
    dir: PathBuf,
    print_command: Option<String>,
}

impl FileReceiptEmitter {
    /// Emitter writing into `dir`, printing with `print_command` when set.
    pub fn new(dir: impl Into<PathBuf>, print_command: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            print_command,
        }
    }

    /// Emitter configured from the `[store]` settings.
    #[must_use]
    pub fn from_store(store: &StoreConfig) -> Self {
        Self::new(store.receipt_dir.clone(), store.print_command.clone())
    }

    /// Path a receipt is written to: `Receipt_<order>_<yyyyMMdd_HHmmss>.txt`.
    ///
    /// A reprint landing in the same second gets a `_2`, `_3`, ... suffix instead of
    /// overwriting the earlier file.
    #[must_use]
    pub fn path_for(&self, receipt: &Receipt) -> PathBuf {
        let stem = format!(
            "Receipt_{}_{}",
            receipt.order_id,
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        let mut path = self.dir.join(format!("{stem}.txt"));
        let mut copy = 1;
        while path.exists() {
            copy += 1;
            path = self.dir.join(format!("{stem}_{copy}.txt"));
        }
        path
    }

    /// Runs the print command to completion; a non-zero exit is a failure.
    fn print(command: &str, path: &Path) -> Result<()> {
        let status = std::process::Command::new(command)
            .arg(path)
            .status()
            .map_err(|e| Error::Receipt {
                message: format!("Failed to start print command '{command}': {e}"),
            })?;

        if !status.success() {
            return Err(Error::Receipt {
                message: format!("Print command '{command}' exited with {status}"),
            });
        }
        Ok(())
    }
}

impl ReceiptEmitter for FileReceiptEmitter {
    fn emit(&self, receipt: &Receipt) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(receipt);
        std::fs::write(&path, receipt.render())?;
        info!("Receipt for order {} written to {:?}", receipt.order_id, path);

        if let Some(command) = &self.print_command {
            debug!("Printing receipt with '{}'", command);
            Self::print(command, &path)?;
        }
        Ok(())
    }
}
