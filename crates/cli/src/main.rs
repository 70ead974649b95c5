//! Bloom CLI - Session migrations, offline quotes and order lookups.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! bloom-cli migrate
//!
//! # Price a saved cart (JSON array of line items)
//! bloom-cli quote cart.json --express
//!
//! # List orders placed with an email
//! bloom-cli orders --email customer@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create the `tower_sessions` schema in `PostgreSQL`
//! - `quote` - Compute totals for a cart file
//! - `orders` - Order history from the commerce backend

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bloom-cli")]
#[command(author, version, about = "Bloom storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the session store schema
    Migrate,
    /// Compute totals for a cart saved as JSON
    Quote {
        /// Path to a JSON array of line items
        cart: PathBuf,

        /// Use express delivery instead of standard
        #[arg(long)]
        express: bool,
    },
    /// List orders placed with an email address
    Orders {
        /// Billing email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::sessions().await?,
        Commands::Quote { cart, express } => commands::quote::run(&cart, express)?,
        Commands::Orders { email } => commands::orders::list(&email).await?,
    }
    Ok(())
}
