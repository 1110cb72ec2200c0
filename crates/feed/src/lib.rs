//! l2book Feed
//!
//! Everything that sits between the exchange and the ingest queue:
//! - Wire message types for the `level2` channel (snapshot, l2update, subscribe)
//! - The `FeedTransport` contract the order book drives
//! - A WebSocket transport and an in-process scripted transport
//!
//! ## Architecture
//!
//! ```text
//! Exchange WebSocket feed
//!         │ text frames
//!    ┌────▼─────┐
//!    │  WsFeed  │  (own thread, current-thread tokio runtime)
//!    └────┬─────┘
//!         │ FeedSink::on_message(payload)
//!    ┌────▼─────┐
//!    │  Ingest  │  (l2book crate)
//!    │  Queue   │
//!    └──────────┘
//! ```
//!
//! Transports never decode payloads; decoding happens on the consumer side via
//! [`FeedMessage::decode`].

pub mod error;
pub mod messages;
pub mod transport;

// Re-export commonly used types
pub use error::{DecodeError, TransportError};
pub use messages::{BookSnapshot, BookUpdate, Change, FeedMessage, SubscribeRequest};
pub use transport::{DEFAULT_FEED_URL, FeedSink, FeedTransport, ScriptedFeed, StopSignal, WsFeed};
