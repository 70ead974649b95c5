//! Offline cart quote.
//!
//! Reads a cart in the session layout (a JSON array of line items) and
//! prints the same totals the storefront shows.

use std::path::Path;

use bloom_core::{Cart, DeliveryMethod, Totals};
use thiserror::Error;

/// Errors from the quote command.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid cart JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load a cart file.
///
/// # Errors
///
/// Returns an error if the file is unreadable or not a valid cart.
pub fn load(path: &Path) -> Result<Cart, QuoteError> {
    let raw = std::fs::read_to_string(path).map_err(|source| QuoteError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Print the totals for a cart file.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded.
pub fn run(path: &Path, express: bool) -> Result<(), QuoteError> {
    let delivery = if express {
        DeliveryMethod::Express
    } else {
        DeliveryMethod::Standard
    };
    let cart = load(path)?;
    let totals = cart.totals(delivery);

    #[allow(clippy::print_stdout)]
    {
        for item in cart.items() {
            println!(
                "{:>3} x {:<32} {:>12}",
                item.quantity.get(),
                item.name,
                item.line_total()
            );
        }
        print!("{}", render(&totals));
    }

    Ok(())
}

/// Format the totals block.
fn render(totals: &Totals) -> String {
    format!(
        "Items:    {}\nSubtotal: {}\nTax ({}): {}\nShipping ({}): {}\nTotal:    {}\n",
        totals.item_count,
        totals.subtotal,
        totals.tax_rate,
        totals.tax_amount,
        totals.delivery.title(),
        totals.shipping,
        totals.grand_total,
    )
}
