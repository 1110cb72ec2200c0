//! Book applier
//!
//! Drains the ingest queue, decodes each payload and applies it to the store.
//! Snapshot levels and l2update changes follow one rule: a nonzero quantity
//! inserts or overwrites the price, zero removes it (no-op if absent).

mod state;
mod stats;

pub use state::ApplierState;
pub use stats::ApplierStats;

use l2book_core::{Price, PriceLevel, ProductId, Quantity};
use l2book_feed::messages::{BookSnapshot, BookUpdate};
use l2book_feed::{DecodeError, FeedMessage, StopSignal};
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::SnapshotPolicy;
use crate::error::QueueError;
use crate::events::{BookEvent, EventPublisher};
use crate::queue::IngestReceiver;
use crate::ready::ReadyLatch;
use crate::store::BookSide;

/// What a single message did to the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// First snapshot; the book just became ready
    Initialized,
    /// A later snapshot
    Snapshot { levels: usize },
    Update { changes: usize },
    /// Error message from the feed
    FeedError {
        message: String,
        reason: Option<String>,
    },
    /// Decoded but not applied
    Ignored,
}

/// Single writer of the order book store
pub struct BookApplier {
    product_id: ProductId,
    bids: BookSide,
    asks: BookSide,
    state: ApplierState,
    policy: SnapshotPolicy,
    initialized: Arc<AtomicBool>,
    stats: Arc<ApplierStats>,
}

impl BookApplier {
    pub fn new(
        product_id: impl Into<String>,
        bids: BookSide,
        asks: BookSide,
        policy: SnapshotPolicy,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            bids,
            asks,
            state: ApplierState::Uninitialized,
            policy,
            initialized: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(ApplierStats::default()),
        }
    }

    pub fn state(&self) -> ApplierState {
        self.state
    }

    /// Flag set (release) once the first snapshot has been applied
    pub fn initialized_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.initialized)
    }

    pub fn stats(&self) -> Arc<ApplierStats> {
        Arc::clone(&self.stats)
    }

    /// Decode `payload` in full, then apply it
    ///
    /// A decode failure leaves the book untouched and is counted.
    pub fn handle_payload(&mut self, payload: &str) -> Result<Applied, DecodeError> {
        match FeedMessage::decode(payload) {
            Ok(message) => Ok(self.apply(message)),
            Err(e) => {
                self.stats.record_decode_failure();
                Err(e)
            }
        }
    }

    /// Apply an already decoded message
    pub fn apply(&mut self, message: FeedMessage) -> Applied {
        match message {
            FeedMessage::Snapshot(snapshot) => {
                if !self.is_own_product(snapshot.product_id.as_deref()) {
                    return self.ignore("snapshot", snapshot.product_id.as_deref());
                }
                self.apply_snapshot(snapshot)
            }
            FeedMessage::Update(update) => {
                if !self.is_own_product(update.product_id.as_deref()) {
                    return self.ignore("l2update", update.product_id.as_deref());
                }
                self.apply_update(update)
            }
            FeedMessage::Subscriptions => {
                info!("Subscription confirmed for {}", self.product_id);
                self.stats.record_ignored();
                Applied::Ignored
            }
            FeedMessage::Error { message, reason } => {
                warn!(
                    "Feed reported an error: {} ({})",
                    message,
                    reason.as_deref().unwrap_or("no reason")
                );
                self.stats.record_ignored();
                Applied::FeedError { message, reason }
            }
            FeedMessage::Other => {
                self.stats.record_ignored();
                Applied::Ignored
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: BookSnapshot) -> Applied {
        let levels = |side: Vec<PriceLevel>| side.into_iter().map(<(Price, Quantity)>::from);
        let (bids, asks) = (levels(snapshot.bids), levels(snapshot.asks));
        let applied = match self.policy {
            SnapshotPolicy::Merge => self.bids.apply_batch(bids) + self.asks.apply_batch(asks),
            SnapshotPolicy::Replace => self.bids.replace(bids) + self.asks.replace(asks),
        };
        self.stats.record_snapshot();

        if self.state.is_ready() {
            debug!("Applied snapshot of {} levels ({:?})", applied, self.policy);
            return Applied::Snapshot { levels: applied };
        }

        self.state = ApplierState::Initialized;
        self.initialized.store(true, Ordering::Release);
        info!(
            "Book {} initialized: {} bids, {} asks",
            self.product_id,
            self.bids.len(),
            self.asks.len()
        );
        Applied::Initialized
    }

    fn apply_update(&mut self, update: BookUpdate) -> Applied {
        let total = update.changes.len();
        // Changes on one side keep their relative order; the sides are independent
        let (buys, sells): (Vec<_>, Vec<_>) = update
            .changes
            .into_iter()
            .partition(|change| change.side.is_bid());

        if !buys.is_empty() {
            self.bids
                .apply_batch(buys.into_iter().map(|c| (c.price, c.quantity)));
        }
        if !sells.is_empty() {
            self.asks
                .apply_batch(sells.into_iter().map(|c| (c.price, c.quantity)));
        }

        self.stats.record_update(total);
        Applied::Update { changes: total }
    }

    /// Messages without a product id are taken as ours
    fn is_own_product(&self, product_id: Option<&str>) -> bool {
        product_id.is_none_or(|id| id == self.product_id)
    }

    fn ignore(&self, kind: &str, product_id: Option<&str>) -> Applied {
        debug!(
            "Ignoring {} for {} (book is {})",
            kind,
            product_id.unwrap_or("?"),
            self.product_id
        );
        self.stats.record_ignored();
        Applied::Ignored
    }
}

/// Handles the applier thread needs besides the book itself
pub(crate) struct ApplierContext {
    pub stop: StopSignal,
    pub latch: ReadyLatch,
    pub events: EventPublisher,
    pub poll_interval: Duration,
}

/// Applier thread body
///
/// Runs until the stop signal is raised or the transport side of the queue is
/// gone and every queued payload has been applied.
pub(crate) fn run(mut applier: BookApplier, queue: IngestReceiver, ctx: ApplierContext) {
    info!("Applier started for {}", applier.product_id);

    loop {
        if ctx.stop.is_raised() {
            debug!("Applier stop requested");
            break;
        }

        let payload = match queue.dequeue(ctx.poll_interval) {
            Ok(Some(payload)) => payload,
            Ok(None) => continue,
            Err(QueueError::Disconnected) => {
                info!("Ingest queue closed, applier exiting");
                break;
            }
        };

        match applier.handle_payload(&payload) {
            Ok(Applied::Initialized) => {
                ctx.latch.open();
                ctx.events.publish(BookEvent::Initialized);
            }
            Ok(Applied::FeedError { message, reason }) => {
                ctx.events.publish(BookEvent::FeedError { message, reason });
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Skipping malformed message: {}", e);
                ctx.events.decode_failed(&e, &payload);
            }
        }
    }

    info!(
        "Applier stopped after {} messages ({} decode failures)",
        applier.stats.messages(),
        applier.stats.decode_failures()
    );
}
