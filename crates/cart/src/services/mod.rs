//! Collaborator seams the cart engine consumes.
//!
//! Implementations belong to the embedding application; the engine only
//! depends on these traits. Small bundled implementations cover the CLI
//! and tests.

pub mod catalog;
pub mod currency;
pub mod notify;

pub use catalog::{Catalog, StaticCatalog};
pub use currency::PriceFormatter;
pub use notify::{BufferNotifier, Notice, NoticeLevel, Notifier, NullNotifier};
