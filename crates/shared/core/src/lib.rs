//! l2book Core Domain
//!
//! Pure domain values shared by the feed and book crates.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{PriceLevel, Side};
pub use values::{Price, ProductId, Quantity};
