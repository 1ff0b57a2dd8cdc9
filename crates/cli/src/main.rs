//! Warung CLI - Cart management and checkout handoff from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the saved cart
//! warung cart show
//!
//! # Add one unit of a catalog product (by id)
//! warung cart add kopi-gayo
//!
//! # Set a quantity (0 removes the item; above-stock is clamped)
//! warung cart set kopi-gayo 3
//!
//! # Produce the order message and WhatsApp link, then clear the cart
//! warung checkout
//! ```
//!
//! # Commands
//!
//! - `cart show|add|remove|set|clear|toggle` - Inspect and mutate the cart
//! - `checkout` - Hand the order off to the configured WhatsApp number
//!
//! # Environment Variables
//!
//! - `WARUNG_DATA_DIR` - Where the durable cart lives (default `.warung`)
//! - `WARUNG_CATALOG_PATH` - Product catalog JSON (default `catalog.json`)
//! - `WARUNG_ORDER_DESTINATION` - WhatsApp number for checkout handoff
//! - `WARUNG_STOCK_REFRESH` - `never` | `on-open` | `on-checkout`
//! - `WARUNG_STORAGE_QUOTA_BYTES` - Override the storage byte budget

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "warung")]
#[command(author, version, about = "Warung cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and mutate the saved cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
    /// Produce the order message and deep link, then clear the cart
    Checkout,
}

#[derive(Subcommand)]
enum CartCommand {
    /// Print the cart contents and totals
    Show,
    /// Add one unit of a catalog product
    Add {
        /// Product id from the catalog file
        id: String,
    },
    /// Remove an item entirely
    Remove {
        /// Product id of the cart entry
        id: String,
    },
    /// Set an item's quantity (0 removes it; above-stock is clamped)
    Set {
        /// Product id of the cart entry
        id: String,

        /// Desired quantity
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Toggle the cart overlay flag
    Toggle,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::cart::CommandError> {
    match cli.command {
        Commands::Cart { action } => match action {
            CartCommand::Show => commands::cart::show(),
            CartCommand::Add { id } => commands::cart::add(&id),
            CartCommand::Remove { id } => commands::cart::remove(&id),
            CartCommand::Set { id, quantity } => commands::cart::set(&id, quantity),
            CartCommand::Clear => commands::cart::clear(),
            CartCommand::Toggle => commands::cart::toggle(),
        },
        Commands::Checkout => commands::cart::checkout(),
    }
}
