//! Warung Core - Shared types library.
//!
//! This crate provides common types used across all Warung components:
//! - `cart` - The shopping-cart engine (store, persistence, checkout handoff)
//! - `cli` - Command-line tools for cart management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! network clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, catalog product snapshots, and cart line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
