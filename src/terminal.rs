//! Line-oriented register front end.
//!
//! Reads one line at a time, as a barcode wedge or a cashier would type it, and
//! renders what the [`Register`] returns. Anything that is not a command keyword is
//! treated like the search box: SKU-looking input is scanned, other text searches
//! the catalog by name.

use crate::{
    core::{
        cart::{CartSnapshot, LineKey},
        catalog,
        receipt::ReceiptEmitter,
        register::{Register, ScanOutcome},
    },
    errors::{Error, Result},
};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

const HELP: &str = "\
Commands:
  <sku>                      scan a barcode (anything with '-' or longer than 6 chars)
  <text>                     search products by name
  add <product> <size> [qty] add a size picked from the catalog
  inc <line> | dec <line>    change the quantity of a cart line
  rm <line>                  remove a cart line
  cart                       show the cart
  find <text>                search products by name
  sizes <product>            list sizes and stock of a product
  low                        list sizes running low on stock
  pay <cash> [customer]      take payment and place the order
  reprint <order>            print the receipt of a past order again
  quit";

/// A parsed line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Add one unit by barcode
    Scan(String),
    /// Add units of a known product size
    Add {
        /// Product id
        product_id: i64,
        /// Size id
        size_id: i64,
        /// Units to add
        quantity: i32,
    },
    /// Raise a cart line (1-based)
    Increment(usize),
    /// Lower a cart line (1-based)
    Decrement(usize),
    /// Remove a cart line (1-based)
    Remove(usize),
    /// Show the cart
    Cart,
    /// Search active products by name
    Find(String),
    /// List the sizes of a product
    Sizes(i64),
    /// List low-stock sizes
    LowStock,
    /// Take payment and check out
    Pay {
        /// Cash handed over
        cash: f64,
        /// Customer name, may be empty
        customer: String,
    },
    /// Emit a past order's receipt again
    Reprint(i64),
    /// Show the command list
    Help,
    /// End the session
    Quit,
}

/// Barcode heuristic: scanner SKUs contain a dash or are longer than six characters.
#[must_use]
pub fn looks_like_sku(input: &str) -> bool {
    input.contains('-') || input.chars().count() > 6
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match keyword.to_lowercase().as_str() {
            "add" => Self::Add {
                product_id: parse_arg(args.first(), "product id")?,
                size_id: parse_arg(args.get(1), "size id")?,
                quantity: args
                    .get(2)
                    .map_or(Ok(1), |_| parse_arg(args.get(2), "quantity"))?,
            },
            "inc" => Self::Increment(parse_arg(args.first(), "line number")?),
            "dec" => Self::Decrement(parse_arg(args.first(), "line number")?),
            "rm" => Self::Remove(parse_arg(args.first(), "line number")?),
            "cart" => Self::Cart,
            "find" => Self::Find(args.join(" ")),
            "sizes" => Self::Sizes(parse_arg(args.first(), "product id")?),
            "low" => Self::LowStock,
            "pay" => Self::Pay {
                cash: parse_arg(args.first(), "cash amount")?,
                customer: args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default(),
            },
            "reprint" => Self::Reprint(parse_arg(args.first(), "order id")?),
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ if looks_like_sku(line) => Self::Scan(line.to_string()),
            _ => Self::Find(line.to_string()),
        };
        Ok(Some(command))
    }
}

fn parse_arg<T: std::str::FromStr>(arg: Option<&&str>, what: &str) -> Result<T> {
    let raw = arg.ok_or_else(|| Error::InvalidCommand {
        message: format!("missing {what}"),
    })?;
    raw.parse().map_err(|_| Error::InvalidCommand {
        message: format!("'{raw}' is not a valid {what}"),
    })
}

/// Reads commands from `input` until it ends or `quit` is entered.
///
/// Errors from individual commands are printed and the session continues; only
/// failures to read input or write output end the loop with an error.
pub async fn run<E, R, W>(register: &mut Register<E>, input: R, out: &mut W) -> Result<()>
where
    E: ReceiptEmitter,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(
        out,
        "{} register ready. Type `help` for commands.",
        register.store().name
    )?;

    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "❌ {e}")?;
                continue;
            }
        };
        debug!(?command, "Terminal command");
        if command == Command::Quit {
            break;
        }
        if let Err(e) = execute(register, command, out).await {
            writeln!(out, "❌ {e}")?;
        }
        out.flush()?;
    }

    writeln!(out, "Goodbye.")?;
    Ok(())
}

async fn execute<E, W>(register: &mut Register<E>, command: Command, out: &mut W) -> Result<()>
where
    E: ReceiptEmitter,
    W: Write,
{
    let currency = register.store().currency.clone();
    match command {
        Command::Scan(sku) => match register.scan(&sku).await? {
            ScanOutcome::Added(snapshot) => write_cart(out, &snapshot, &currency)?,
            ScanOutcome::NotFound { sku } => writeln!(out, "❔ No product with SKU '{sku}'")?,
        },
        Command::Add {
            product_id,
            size_id,
            quantity,
        } => {
            let snapshot = register.add_to_cart(product_id, size_id, quantity).await?;
            write_cart(out, &snapshot, &currency)?;
        }
        Command::Increment(line) => {
            let key = line_key(register, line)?;
            let snapshot = register.increment(key).await?;
            write_cart(out, &snapshot, &currency)?;
        }
        Command::Decrement(line) => {
            let key = line_key(register, line)?;
            let snapshot = register.decrement(key)?;
            write_cart(out, &snapshot, &currency)?;
        }
        Command::Remove(line) => {
            let key = line_key(register, line)?;
            let snapshot = register.remove(key)?;
            write_cart(out, &snapshot, &currency)?;
        }
        Command::Cart => write_cart(out, &register.snapshot(), &currency)?,
        Command::Find(text) => {
            let products = catalog::search_products(register.db(), &text).await?;
            if products.is_empty() {
                writeln!(out, "No products match '{text}'")?;
            }
            for product in products {
                write!(
                    out,
                    "#{} {} - {:.2} [{}]",
                    product.id, product.name, product.price, product.category
                )?;
                match product.first_image() {
                    Some(image) => writeln!(out, " {image}")?,
                    None => writeln!(out)?,
                }
            }
        }
        Command::Sizes(product_id) => {
            let sizes = catalog::get_sizes_for_product(register.db(), product_id).await?;
            if sizes.is_empty() {
                writeln!(out, "No sizes for product {product_id}")?;
            }
            for size in sizes {
                writeln!(
                    out,
                    "#{} size {}: {} in stock (SKU {})",
                    size.id, size.size_value, size.stock, size.sku
                )?;
            }
        }
        Command::LowStock => {
            let low = register.low_stock().await?;
            if low.is_empty() {
                writeln!(out, "No sizes are running low")?;
            }
            for entry in low {
                writeln!(
                    out,
                    "{} size {}: {} left (SKU {})",
                    entry.product_name, entry.size.size_value, entry.size.stock, entry.size.sku
                )?;
            }
        }
        Command::Pay { cash, customer } => {
            let outcome = register.checkout(&customer, cash).await?;
            writeln!(
                out,
                "✅ Payment completed successfully! Order #{} total {} {:.2}, change {} {:.2}",
                outcome.order.id, currency, outcome.order.total, currency, outcome.change_due
            )?;
            if let Some(warning) = outcome.receipt_warning {
                writeln!(out, "⚠️ Receipt not printed: {warning}")?;
            }
        }
        Command::Reprint(order_id) => {
            register.reprint(order_id).await?;
            writeln!(out, "✅ Receipt for order #{order_id} sent")?;
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}

fn line_key<E: ReceiptEmitter>(register: &Register<E>, line: usize) -> Result<LineKey> {
    register
        .snapshot()
        .lines
        .get(line.wrapping_sub(1))
        .map(|l| l.key())
        .ok_or_else(|| Error::InvalidCommand {
            message: format!("no cart line {line}"),
        })
}

fn write_cart<W: Write>(out: &mut W, snapshot: &CartSnapshot, currency: &str) -> Result<()> {
    if snapshot.lines.is_empty() {
        writeln!(out, "Cart is empty.")?;
        return Ok(());
    }
    for (i, line) in snapshot.lines.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {} ({}) {} x {:.2} = {:.2}",
            i + 1,
            line.product_name,
            line.size_value,
            line.quantity,
            line.unit_price,
            line.line_total()
        )?;
    }
    writeln!(out, "Subtotal: {:.2}", snapshot.subtotal)?;
    writeln!(out, "Total: {currency} {:.2}", snapshot.total)?;
    Ok(())
}
