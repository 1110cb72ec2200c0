//! l2book
//!
//! In-memory mirror of an exchange's level-2 order book for one product,
//! kept live from a streaming feed (one snapshot, then l2update deltas).
//!
//! ## Architecture
//!
//! ```text
//! FeedTransport ──► IngestSender ─┐
//!   (feed-transport thread)       │ crossbeam SPSC queue
//!                                 ▼
//!                           IngestReceiver ──► BookApplier ──► BookSide (bids/asks)
//!                              (book-applier thread)                │
//!                                                                   ▼
//!                                                       SideView (any thread)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use l2book::{BookConfig, OrderBook};
//!
//! let book = OrderBook::start(BookConfig::new("BTC-USD"))?;
//! if let Some(bid) = book.best_bid() {
//!     println!("best bid {} x {}", bid.price, bid.quantity);
//! }
//! book.shutdown()?;
//! # Ok::<(), l2book::BookError>(())
//! ```

pub mod applier;
pub mod book;
pub mod config;
pub mod error;
pub mod events;
pub mod queue;
pub mod store;

mod ready;

// Re-export commonly used types
pub use applier::{Applied, ApplierState, ApplierStats, BookApplier};
pub use book::OrderBook;
pub use config::{BookConfig, ConfigError, SnapshotPolicy, load_config, load_default_config};
pub use error::{BookError, QueueError};
pub use events::BookEvent;
pub use queue::{IngestReceiver, IngestSender, QueueDepth, ingest_queue};
pub use store::{BookSide, DepthSnapshot, SideKind, SideView};

pub use l2book_core::{Price, PriceLevel, Quantity, Side};
pub use l2book_feed::{FeedTransport, ScriptedFeed, StopSignal, WsFeed};
