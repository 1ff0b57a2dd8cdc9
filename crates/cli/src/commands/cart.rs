//! Cart commands for the terminal storefront.
//!
//! Every command restores the saved cart from `WARUNG_DATA_DIR`, applies at
//! most one action through the cart engine, and prints the result. The
//! engine's persistence and stock rules run unchanged: a quantity set above
//! stock is clamped, an oversized cart degrades instead of failing, and any
//! notice the engine raises while saving is forwarded to the log.
//!
//! # Usage
//!
//! ```bash
//! # Inspect the saved cart
//! warung cart show
//!
//! # Mutate it
//! warung cart add kopi-gayo
//! warung cart set kopi-gayo 3
//! warung cart remove kopi-gayo
//!
//! # Hand the order off to WhatsApp
//! warung checkout
//! ```

use std::io;
use std::path::Path;
use std::rc::Rc;

use rust_decimal::Decimal;
use thiserror::Error;

use warung_cart::services::{BufferNotifier, Catalog, NoticeLevel, StaticCatalog};
use warung_cart::storage::{DirBackend, StorageError};
use warung_cart::{CartAction, CartSession, CartState, CheckoutError, CheckoutHandoff};
use warung_core::{CatalogProduct, ProductId};

use crate::config::{CliConfig, ConfigError};

/// Errors that can occur during cart commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Environment configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The catalog file exists but could not be read.
    #[error("Cannot read catalog {0}: {1}")]
    CatalogRead(String, #[source] io::Error),

    /// The catalog file is not valid product JSON.
    #[error("Cannot parse catalog {0}: {1}")]
    CatalogParse(String, #[source] serde_json::Error),

    /// The cart storage directory could not be used.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The requested product id is not in the catalog.
    #[error("No product '{0}' in the catalog")]
    UnknownProduct(String),

    /// Checkout refused (empty cart, missing destination, bad link).
    #[error("Checkout failed: {0}")]
    Checkout(#[from] CheckoutError),
}

/// A command's working set: the restored session plus the collaborators
/// the command itself consults.
struct CartCli {
    session: CartSession<DirBackend>,
    catalog: StaticCatalog,
    notifier: Rc<BufferNotifier>,
}

impl CartCli {
    /// Load configuration, catalog and the saved cart.
    fn open() -> Result<Self, CommandError> {
        let config = CliConfig::from_env()?;
        let catalog = load_catalog(&config.catalog_path)?;
        let backend = match config.storage_quota_bytes {
            Some(quota) => DirBackend::open_with_quota(&config.data_dir, quota)?,
            None => DirBackend::open(&config.data_dir)?,
        };
        let notifier = Rc::new(BufferNotifier::new());
        let session = CartSession::restore(
            config.cart,
            backend,
            Box::new(catalog.clone()),
            Box::new(Rc::clone(&notifier)),
        );
        Ok(Self {
            session,
            catalog,
            notifier,
        })
    }

    /// Look a product up in the catalog.
    fn product(&self, id: &str) -> Result<CatalogProduct, CommandError> {
        self.catalog
            .product(&ProductId::new(id))
            .ok_or_else(|| CommandError::UnknownProduct(id.to_owned()))
    }

    /// Forward buffered engine notices to the log.
    fn report(&self) {
        for notice in self.notifier.drain() {
            match notice.level {
                NoticeLevel::Info => tracing::info!("{}", notice.message),
                NoticeLevel::Warning => tracing::warn!("{}", notice.message),
                NoticeLevel::Error => tracing::error!("{}", notice.message),
            }
        }
    }
}

/// Print the cart contents and totals.
///
/// # Errors
///
/// Returns an error if configuration, catalog or storage cannot be loaded.
pub fn show() -> Result<(), CommandError> {
    let cli = CartCli::open()?;
    cli.report();
    print_cart(cli.session.state());
    Ok(())
}

/// Add one unit of a catalog product to the cart.
///
/// # Errors
///
/// Returns [`CommandError::UnknownProduct`] if the id is not in the catalog.
pub fn add(id: &str) -> Result<(), CommandError> {
    let mut cli = CartCli::open()?;
    let product = cli.product(id)?;
    if product.stock == 0 {
        tracing::warn!("'{id}' is out of stock");
    }
    cli.session.dispatch(CartAction::AddItem(product));
    cli.report();
    print_cart(cli.session.state());
    Ok(())
}

/// Remove an item from the cart entirely.
///
/// # Errors
///
/// Returns an error if configuration, catalog or storage cannot be loaded.
pub fn remove(id: &str) -> Result<(), CommandError> {
    let mut cli = CartCli::open()?;
    let product_id = ProductId::new(id);
    if cli.session.state().item(&product_id).is_none() {
        tracing::warn!("'{id}' is not in the cart");
    }
    cli.session.dispatch(CartAction::RemoveItem(product_id));
    cli.report();
    print_cart(cli.session.state());
    Ok(())
}

/// Set an item's quantity. Zero or less removes the item; a quantity
/// above the recorded stock is clamped down to it.
///
/// # Errors
///
/// Returns an error if configuration, catalog or storage cannot be loaded.
pub fn set(id: &str, quantity: i64) -> Result<(), CommandError> {
    let mut cli = CartCli::open()?;
    let product_id = ProductId::new(id);
    if cli.session.state().item(&product_id).is_none() {
        tracing::warn!("'{id}' is not in the cart");
    }
    cli.session.dispatch(CartAction::UpdateQuantity {
        id: product_id,
        quantity,
    });
    cli.report();
    print_cart(cli.session.state());
    Ok(())
}

/// Empty the cart, in memory and on disk.
///
/// # Errors
///
/// Returns an error if configuration, catalog or storage cannot be loaded.
pub fn clear() -> Result<(), CommandError> {
    let mut cli = CartCli::open()?;
    cli.session.dispatch(CartAction::ClearCart);
    cli.report();
    print_cart(cli.session.state());
    Ok(())
}

/// Toggle the cart overlay flag.
///
/// With `WARUNG_STOCK_REFRESH=on-open`, opening the overlay re-checks
/// stock against the catalog and persists any clamped quantities.
///
/// # Errors
///
/// Returns an error if configuration, catalog or storage cannot be loaded.
pub fn toggle() -> Result<(), CommandError> {
    let mut cli = CartCli::open()?;
    cli.session.dispatch(CartAction::ToggleCart);
    let open = cli.session.state().is_open();
    cli.report();
    print_overlay(open);
    Ok(())
}

/// Produce the order message and WhatsApp link, then clear the cart.
///
/// # Errors
///
/// Returns [`CommandError::Checkout`] if the cart is empty or no order
/// destination is configured; the cart is left untouched in that case.
pub fn checkout() -> Result<(), CommandError> {
    let mut cli = CartCli::open()?;
    let result = cli.session.checkout(&format_rupiah);
    // Surface save notices even when the handoff itself failed
    cli.report();
    let handoff = result?;
    print_handoff(&handoff);
    Ok(())
}

/// Load the product catalog from a JSON file.
///
/// A missing file is not an error: the cart still works (show, remove,
/// clear), only additions need catalog entries.
fn load_catalog(path: &Path) -> Result<StaticCatalog, CommandError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no catalog file, starting empty");
        return Ok(StaticCatalog::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CommandError::CatalogRead(path.display().to_string(), e))?;
    let products: Vec<CatalogProduct> = serde_json::from_str(&raw)
        .map_err(|e| CommandError::CatalogParse(path.display().to_string(), e))?;
    tracing::debug!(products = products.len(), "catalog loaded");
    Ok(StaticCatalog::new(products))
}

/// Format a rupiah amount the way the storefront shows it: `Rp` plus the
/// rounded integer amount with dot thousand separators.
fn format_rupiah(amount: Decimal) -> String {
    let whole = amount.round_dp(0).to_string();
    let digits = whole.strip_prefix('-').unwrap_or(&whole);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if whole.starts_with('-') { "-" } else { "" };
    format!("{sign}Rp{grouped}")
}

#[allow(clippy::print_stdout)]
fn print_cart(state: &CartState) {
    if state.is_empty() {
        println!("Cart is empty.");
        return;
    }
    for item in state.items() {
        println!(
            "{:<16} {:<32} x{:<4} {:>12} {:>14}",
            item.id.as_str(),
            item.name,
            item.quantity,
            format_rupiah(item.effective_unit_price()),
            format_rupiah(item.line_total()),
        );
    }
    let totals = state.totals();
    println!();
    println!("{} item(s), total {}", totals.items, format_rupiah(totals.price));
}

#[allow(clippy::print_stdout)]
fn print_overlay(open: bool) {
    println!(
        "Cart overlay is now {}.",
        if open { "open" } else { "closed" }
    );
}

#[allow(clippy::print_stdout)]
fn print_handoff(handoff: &CheckoutHandoff) {
    println!("{}", handoff.message);
    println!();
    println!("Send the order: {}", handoff.url);
}
