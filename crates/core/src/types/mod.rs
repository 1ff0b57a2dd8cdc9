//! Core types for Warung.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod product;

pub use cart::{CartItem, NAME_MAX_CHARS, bounded_name};
pub use id::*;
pub use product::CatalogProduct;
