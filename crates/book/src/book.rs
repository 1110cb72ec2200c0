//! Order book lifecycle
//!
//! [`OrderBook`] owns the store and the two worker threads feeding it:
//!
//! ```text
//! feed-transport thread ──► ingest queue ──► book-applier thread ──► store
//!                                                                     ▲
//!                                                     readers (SideView)
//! ```
//!
//! Construction blocks until the first snapshot has been applied. Teardown
//! stops both workers and joins them before the store is released.

use crossbeam_channel::Receiver;
use l2book_core::{PriceLevel, ProductId};
use l2book_feed::{FeedTransport, StopSignal, SubscribeRequest, TransportError, WsFeed};
use log::{error, info, warn};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::applier::{self, ApplierContext, ApplierStats, BookApplier};
use crate::config::BookConfig;
use crate::error::BookError;
use crate::events::{BookEvent, EventPublisher};
use crate::queue::{QueueDepth, ingest_queue};
use crate::ready::ReadyLatch;
use crate::store::{BookSide, DepthSnapshot, SideKind, SideView};

const TRANSPORT_THREAD: &str = "feed-transport";
const APPLIER_THREAD: &str = "book-applier";

/// Live, continuously updated level-2 book for one product
pub struct OrderBook {
    product_id: ProductId,
    bids: SideView,
    asks: SideView,
    initialized: Arc<AtomicBool>,
    stats: Arc<ApplierStats>,
    queue_depth: QueueDepth,
    events: Receiver<BookEvent>,
    workers: Workers,
}

impl OrderBook {
    /// Connect to `config.feed_url` over WebSocket and wait for the first snapshot
    pub fn start(config: BookConfig) -> Result<Self, BookError> {
        let transport =
            WsFeed::new(config.feed_url.as_str()).with_connect_timeout(config.connect_timeout());
        Self::with_transport(config, transport)
    }

    /// Build the book on any transport and wait for the first snapshot
    ///
    /// Fails if no snapshot arrives within `config.init_timeout()`, or if a
    /// worker exits first; the workers are torn down before returning.
    pub fn with_transport<T: FeedTransport>(
        config: BookConfig,
        transport: T,
    ) -> Result<Self, BookError> {
        config.validate()?;
        info!(
            "Starting order book for {} via {}",
            config.product_id,
            transport.name()
        );

        let bids = BookSide::new(SideKind::Bid);
        let asks = BookSide::new(SideKind::Ask);
        let (bid_view, ask_view) = (bids.view(), asks.view());

        let book_applier = BookApplier::new(
            config.product_id.clone(),
            bids,
            asks,
            config.snapshot_policy,
        );
        let initialized = book_applier.initialized_flag();
        let stats = book_applier.stats();

        let (sender, receiver) = ingest_queue(config.queue_capacity);
        let queue_depth = receiver.depth_gauge();
        let (events, event_rx) = EventPublisher::channel(config.event_capacity);
        let latch = ReadyLatch::new();
        let transport_error = Arc::new(Mutex::new(None));

        let mut workers = Workers::new();

        let context = ApplierContext {
            stop: workers.applier_stop.clone(),
            latch: latch.clone(),
            events: events.clone(),
            poll_interval: config.poll_interval(),
        };
        let guard = ApplierExit {
            latch: latch.clone(),
            events: events.clone(),
            transport_error: Arc::clone(&transport_error),
        };
        workers.applier = Some(thread::Builder::new().name(APPLIER_THREAD.into()).spawn(
            move || {
                let _guard = guard;
                applier::run(book_applier, receiver, context);
            },
        )?);

        let request = SubscribeRequest::new(config.product_id.as_str(), config.channel.as_str());
        let stop = workers.transport_stop.clone();
        let mut transport = transport;
        workers.transport = Some(thread::Builder::new().name(TRANSPORT_THREAD.into()).spawn(
            move || {
                let mut sink = sender;
                let result = transport.run(&request, &mut sink, &stop);
                let name = transport.name();
                report_transport_exit(name, result, &stop, &events, &transport_error);
                // The applier sees the disconnect only after the error is recorded
                drop(sink);
            },
        )?);

        if let Err(e) = latch.wait(config.init_timeout()) {
            error!("Order book for {} failed to start: {}", config.product_id, e);
            return Err(e);
        }
        info!("Order book for {} is live", config.product_id);

        Ok(OrderBook {
            product_id: config.product_id,
            bids: bid_view,
            asks: ask_view,
            initialized,
            stats,
            queue_depth,
            events: event_rx,
            workers,
        })
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Read view of the bid side
    pub fn bids(&self) -> &SideView {
        &self.bids
    }

    /// Read view of the ask side
    pub fn asks(&self) -> &SideView {
        &self.asks
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.best()
    }

    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.best()
    }

    /// Midpoint of best bid and best ask
    pub fn mid_price(&self) -> Option<Decimal> {
        let (bid, ask) = (self.best_bid()?, self.best_ask()?);
        Some((bid.price + ask.price) / Decimal::TWO)
    }

    /// Best ask minus best bid
    pub fn spread(&self) -> Option<Decimal> {
        let (bid, ask) = (self.best_bid()?, self.best_ask()?);
        Some(ask.price - bid.price)
    }

    /// Owned copy of both sides, best levels first.
    /// Each side is copied under its own read lock; the pair is not one atomic read.
    pub fn snapshot(&self) -> DepthSnapshot {
        DepthSnapshot {
            bids: self.bids.descending(),
            asks: self.asks.ascending(),
        }
    }

    pub fn stats(&self) -> &ApplierStats {
        &self.stats
    }

    /// Payloads received but not yet applied
    pub fn queue_len(&self) -> usize {
        self.queue_depth.get()
    }

    /// Lifecycle and error events; lossy when not drained
    pub fn events(&self) -> &Receiver<BookEvent> {
        &self.events
    }

    /// Stop both workers and wait for them to exit
    pub fn shutdown(mut self) -> Result<(), BookError> {
        info!("Shutting down order book for {}", self.product_id);
        self.workers.stop()
    }
}

/// Record how the transport ended. Runs on the transport thread.
fn report_transport_exit(
    name: &str,
    result: Result<(), TransportError>,
    stop: &StopSignal,
    events: &EventPublisher,
    slot: &Mutex<Option<TransportError>>,
) {
    match result {
        Ok(()) => {
            info!("Transport {} stopped", name);
            events.publish(BookEvent::TransportStopped);
        }
        // A bounded queue closes under a blocked producer during shutdown
        Err(e) if stop.is_raised() => {
            info!("Transport {} stopped: {}", name, e);
            events.publish(BookEvent::TransportStopped);
        }
        Err(e) => {
            // No reconnect: nothing will update the book after this
            error!("Transport {} failed: {}; book updates are frozen", name, e);
            events.publish(BookEvent::TransportFailed(e.to_string()));
            *slot.lock() = Some(e);
        }
    }
}

/// Dropped when the applier thread ends, including by panic
struct ApplierExit {
    latch: ReadyLatch,
    events: EventPublisher,
    transport_error: Arc<Mutex<Option<TransportError>>>,
}

impl Drop for ApplierExit {
    fn drop(&mut self) {
        // Only reaches a waiter if the book never initialized
        let cause = match self.transport_error.lock().take() {
            Some(e) => BookError::Transport(e),
            None => BookError::WorkerStopped(APPLIER_THREAD),
        };
        self.latch.fail(cause);
        self.events.publish(BookEvent::ApplierStopped);
    }
}

/// Join handles and stop signals of both workers
struct Workers {
    transport_stop: StopSignal,
    applier_stop: StopSignal,
    transport: Option<JoinHandle<()>>,
    applier: Option<JoinHandle<()>>,
}

impl Workers {
    fn new() -> Self {
        Workers {
            transport_stop: StopSignal::new(),
            applier_stop: StopSignal::new(),
            transport: None,
            applier: None,
        }
    }

    /// Transport first, so nothing new is queued while the applier winds down
    fn stop(&mut self) -> Result<(), BookError> {
        self.transport_stop.raise();
        self.applier_stop.raise();

        let mut result = Ok(());
        for (name, handle) in [
            (TRANSPORT_THREAD, self.transport.take()),
            (APPLIER_THREAD, self.applier.take()),
        ] {
            let Some(handle) = handle else { continue };
            if handle.join().is_err() {
                error!("Worker {} panicked", name);
                result = Err(BookError::WorkerPanicked(name));
            }
        }
        result
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        if self.transport.is_none() && self.applier.is_none() {
            return;
        }
        if let Err(e) = self.stop() {
            warn!("Order book teardown: {}", e);
        }
    }
}
