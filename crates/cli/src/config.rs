//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Every variable is optional; the CLI runs with working defaults.
//!
//! - `WARUNG_DATA_DIR` - Directory holding the saved cart (default: `.warung`)
//! - `WARUNG_CATALOG_PATH` - Product catalog JSON file (default: `catalog.json`)
//! - `WARUNG_ORDER_DESTINATION` - WhatsApp number that receives checkout orders
//! - `WARUNG_STOCK_REFRESH` - When to re-check stock against the catalog:
//!   `never`, `on-open` or `on-checkout` (default: `never`)
//! - `WARUNG_STORAGE_QUOTA_BYTES` - Byte budget for the cart directory
//!   (default: 5 MiB)

use std::path::PathBuf;

use thiserror::Error;
use warung_cart::CartConfig;

const DEFAULT_DATA_DIR: &str = ".warung";
const DEFAULT_CATALOG_PATH: &str = "catalog.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// CLI application configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory where the cart storage backend keeps its files
    pub data_dir: PathBuf,
    /// Path to the product catalog JSON file
    pub catalog_path: PathBuf,
    /// Storage quota override; `None` uses the backend default
    pub storage_quota_bytes: Option<usize>,
    /// Cart engine configuration (persistence thresholds, refresh policy, checkout)
    pub cart: CartConfig,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default("WARUNG_DATA_DIR", DEFAULT_DATA_DIR));
        let catalog_path = PathBuf::from(get_env_or_default(
            "WARUNG_CATALOG_PATH",
            DEFAULT_CATALOG_PATH,
        ));
        let storage_quota_bytes = get_optional_env("WARUNG_STORAGE_QUOTA_BYTES")
            .map(|raw| parse_env("WARUNG_STORAGE_QUOTA_BYTES", &raw))
            .transpose()?;

        let mut cart = CartConfig::default();
        if let Some(raw) = get_optional_env("WARUNG_STOCK_REFRESH") {
            cart.stock_refresh = parse_env("WARUNG_STOCK_REFRESH", &raw)?;
        }
        if let Some(destination) = get_optional_env("WARUNG_ORDER_DESTINATION") {
            cart.checkout.destination = destination;
        }

        Ok(Self {
            data_dir,
            catalog_path,
            storage_quota_bytes,
            cart,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a raw environment value, mapping failures to `InvalidEnvVar`.
fn parse_env<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
