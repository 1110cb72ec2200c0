//! Order book configuration
//!
//! JSON-based configuration with serde defaults for every field, so a config
//! file only needs the values it changes.
//!
//! # Example Configuration
//!
//! ```json
//! {
//!   "product_id": "ETH-USD",
//!   "feed_url": "wss://ws-feed.exchange.coinbase.com",
//!   "init_timeout_ms": 30000,
//!   "queue_capacity": null,
//!   "snapshot_policy": "merge"
//! }
//! ```

mod loader;
mod types;

pub use loader::{ConfigError, load_config, load_config_from_str, load_default_config};
pub use types::{BookConfig, SnapshotPolicy};
