//! Transport abstraction layer
//!
//! A transport owns the connection to the exchange. The order book runs it on
//! a dedicated thread and hands it a [`FeedSink`] (the ingest queue) and a
//! [`StopSignal`]. The trait-based design allows swapping the WebSocket client
//! for the scripted transport in tests, or another venue's client later.

mod scripted;
mod stop;
mod websocket;

pub use scripted::ScriptedFeed;
pub use stop::StopSignal;
pub use websocket::{DEFAULT_FEED_URL, WsFeed};

use crate::error::TransportError;
use crate::messages::SubscribeRequest;

/// Receives raw payloads in arrival order
///
/// Implementations must not block the caller beyond uncontended
/// synchronization, unless they deliberately apply backpressure.
pub trait FeedSink: Send {
    /// Called once per inbound message. An error stops the transport.
    fn on_message(&mut self, payload: String) -> Result<(), TransportError>;
}

/// Collects payloads in memory
impl FeedSink for Vec<String> {
    fn on_message(&mut self, payload: String) -> Result<(), TransportError> {
        self.push(payload);
        Ok(())
    }
}

/// A market data transport
pub trait FeedTransport: Send + 'static {
    /// Short name for thread names and log lines
    fn name(&self) -> &str;

    /// Connect, send `request`, then deliver every inbound message to `sink`
    /// until `stop` is raised (returns `Ok`) or the connection fails.
    fn run(
        &mut self,
        request: &SubscribeRequest,
        sink: &mut dyn FeedSink,
        stop: &StopSignal,
    ) -> Result<(), TransportError>;
}

impl<T: FeedTransport + ?Sized> FeedTransport for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(
        &mut self,
        request: &SubscribeRequest,
        sink: &mut dyn FeedSink,
        stop: &StopSignal,
    ) -> Result<(), TransportError> {
        (**self).run(request, sink, stop)
    }
}
