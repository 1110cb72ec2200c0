//! Lifecycle and error events surfaced to the owner of the book
//!
//! Published on a bounded crossbeam channel. Publishing never blocks a worker:
//! when nobody drains the channel and it fills up, new events are dropped.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use log::trace;

/// Something the owner of the book may want to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookEvent {
    /// First snapshot applied; the book is live
    Initialized,
    /// The feed reported an error message (e.g. rejected subscription)
    FeedError {
        message: String,
        reason: Option<String>,
    },
    /// A payload could not be decoded and was skipped
    DecodeFailed { error: String, payload: String },
    /// The transport returned after a stop request
    TransportStopped,
    /// The transport failed; no further updates will arrive
    TransportFailed(String),
    /// The applier thread exited
    ApplierStopped,
}

/// Longest payload excerpt carried by a `DecodeFailed` event
const PAYLOAD_EXCERPT_CHARS: usize = 256;

/// Publishing half, cloned into each worker
#[derive(Clone)]
pub struct EventPublisher {
    tx: Sender<BookEvent>,
}

impl EventPublisher {
    /// Create a publisher and the receiver handed out by the book
    pub fn channel(capacity: usize) -> (Self, Receiver<BookEvent>) {
        let (tx, rx) = bounded(capacity);
        (Self { tx }, rx)
    }

    pub fn publish(&self, event: BookEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => trace!("Event channel full, dropping {:?}", event),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    pub fn decode_failed(&self, error: impl ToString, payload: &str) {
        self.publish(BookEvent::DecodeFailed {
            error: error.to_string(),
            payload: excerpt(payload),
        });
    }
}

fn excerpt(payload: &str) -> String {
    match payload.char_indices().nth(PAYLOAD_EXCERPT_CHARS) {
        Some((end, _)) => format!("{}...", &payload[..end]),
        None => payload.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_receive() {
        let (publisher, rx) = EventPublisher::channel(4);
        publisher.publish(BookEvent::Initialized);
        publisher.publish(BookEvent::TransportFailed("reset".to_string()));

        assert_eq!(rx.try_recv().unwrap(), BookEvent::Initialized);
        assert_eq!(
            rx.try_recv().unwrap(),
            BookEvent::TransportFailed("reset".to_string())
        );
    }

    #[test]
    fn test_full_channel_drops_new_events() {
        let (publisher, rx) = EventPublisher::channel(1);
        publisher.publish(BookEvent::Initialized);
        publisher.publish(BookEvent::ApplierStopped);

        assert_eq!(rx.len(), 1);
        assert_eq!(rx.try_recv().unwrap(), BookEvent::Initialized);
    }

    #[test]
    fn test_publish_without_receiver_is_silent() {
        let (publisher, rx) = EventPublisher::channel(1);
        drop(rx);
        publisher.publish(BookEvent::ApplierStopped);
    }

    #[test]
    fn test_decode_failed_truncates_payload() {
        let (publisher, rx) = EventPublisher::channel(1);
        let payload = "x".repeat(1000);
        publisher.decode_failed("bad", &payload);

        let BookEvent::DecodeFailed { error, payload } = rx.try_recv().unwrap() else {
            panic!("Expected DecodeFailed");
        };
        assert_eq!(error, "bad");
        assert_eq!(payload.len(), PAYLOAD_EXCERPT_CHARS + 3);
        assert!(payload.ends_with("..."));
    }
}
