//! Ingest queue
//!
//! Single-producer/single-consumer FIFO of raw feed payloads between the
//! transport thread and the applier thread, built on crossbeam channels.
//! Unbounded by default so the network-facing producer never waits on the
//! applier; with a capacity the producer blocks when the queue is full
//! (backpressure) instead of letting memory grow.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use l2book_feed::{FeedSink, TransportError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::QueueError;

/// Producer half, held by the transport thread
pub struct IngestSender {
    tx: Sender<String>,
    depth: Arc<AtomicUsize>,
}

/// Consumer half, held by the applier thread
pub struct IngestReceiver {
    rx: Receiver<String>,
    depth: Arc<AtomicUsize>,
}

/// Create a queue; `None` means unbounded
pub fn ingest_queue(capacity: Option<usize>) -> (IngestSender, IngestReceiver) {
    let (tx, rx) = match capacity {
        Some(capacity) => bounded(capacity),
        None => unbounded(),
    };
    let depth = Arc::new(AtomicUsize::new(0));
    (
        IngestSender {
            tx,
            depth: Arc::clone(&depth),
        },
        IngestReceiver { rx, depth },
    )
}

impl IngestSender {
    /// Append a payload. Blocks only when the queue is bounded and full.
    pub fn enqueue(&self, payload: String) -> Result<(), QueueError> {
        // Count first so the consumer never decrements below zero
        self.depth.fetch_add(1, Ordering::Relaxed);
        self.tx.send(payload).map_err(|_| {
            self.depth.fetch_sub(1, Ordering::Relaxed);
            QueueError::Disconnected
        })
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

/// The transport writes straight into the queue
impl FeedSink for IngestSender {
    fn on_message(&mut self, payload: String) -> Result<(), TransportError> {
        self.enqueue(payload).map_err(|_| TransportError::SinkClosed)
    }
}

impl IngestReceiver {
    /// Wait up to `timeout` for the next payload.
    ///
    /// `Ok(None)` when nothing arrived in time; `Err(Disconnected)` once the
    /// producer is gone and every queued payload has been taken.
    pub fn dequeue(&self, timeout: Duration) -> Result<Option<String>, QueueError> {
        match self.rx.recv_timeout(timeout) {
            Ok(payload) => {
                self.depth.fetch_sub(1, Ordering::Relaxed);
                Ok(Some(payload))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(QueueError::Disconnected),
        }
    }

    /// Take the next payload without waiting
    pub fn try_dequeue(&self) -> Option<String> {
        let payload = self.rx.try_recv().ok()?;
        self.depth.fetch_sub(1, Ordering::Relaxed);
        Some(payload)
    }

    /// Handle reporting the queue depth, for monitoring
    pub fn depth_gauge(&self) -> QueueDepth {
        QueueDepth {
            depth: Arc::clone(&self.depth),
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Observes the queue depth without holding either end of the channel
#[derive(Debug, Clone)]
pub struct QueueDepth {
    depth: Arc<AtomicUsize>,
}

impl QueueDepth {
    pub fn get(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }
}
