//! Order history lookup against the commerce backend.
//!
//! # Environment Variables
//!
//! - `COMMERCE_API_URL`, `COMMERCE_CONSUMER_KEY`, `COMMERCE_CONSUMER_SECRET`

use bloom_core::Email;
use bloom_storefront::commerce::{CommerceClient, OrderApi};
use bloom_storefront::config::CommerceConfig;

/// Print every order placed with `email`, newest first as the API returns them.
///
/// # Errors
///
/// Returns an error for an invalid email, missing configuration or a failed request.
pub async fn list(email: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email)?;
    let config = CommerceConfig::from_env()?;
    let client = CommerceClient::new(&config);

    let orders = client.list_orders(&email).await?;
    tracing::info!(count = orders.len(), "orders fetched");

    #[allow(clippy::print_stdout)]
    {
        if orders.is_empty() {
            println!("No orders for {email}");
        }
        for order in &orders {
            println!(
                "#{:<8} {}  {:<12} {:>12}  ({} items)",
                order.number,
                order.date_created.format("%Y-%m-%d"),
                order.status,
                order.total,
                order.line_items.len(),
            );
        }
    }

    Ok(())
}
