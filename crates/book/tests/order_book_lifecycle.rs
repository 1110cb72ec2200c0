//! Order Book Lifecycle Integration Test
//!
//! Drives a full `OrderBook` (transport thread, ingest queue, applier thread)
//! with in-process transports:
//! - Snapshot + delta scenarios
//! - Malformed payloads, init timeout, transport failures
//! - Concurrent readers against a continuously writing applier
//! - Bounded shutdown

use l2book::{
    BookConfig, BookError, BookEvent, FeedTransport, OrderBook, PriceLevel, ScriptedFeed,
    SnapshotPolicy, StopSignal,
};
use l2book_feed::{FeedSink, SubscribeRequest, TransportError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const SNAPSHOT: &str = r#"{"type":"snapshot","product_id":"BTC-USD",
    "bids":[["100","1"],["99","2"]],"asks":[["101","1"]]}"#;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_config() -> BookConfig {
    BookConfig::new("BTC-USD")
        .with_init_timeout(Some(Duration::from_secs(5)))
        .with_poll_interval(Duration::from_millis(5))
}

fn l2update(side: &str, price: &str, size: &str) -> String {
    format!(
        r#"{{"type":"l2update","product_id":"BTC-USD","changes":[["{}","{}","{}"]]}}"#,
        side, price, size
    )
}

/// Poll `condition` until it holds or `timeout` elapses
fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Test the snapshot initializes the book before the constructor returns
#[test]
fn test_snapshot_initializes_book() {
    init_logger();
    let book = OrderBook::with_transport(test_config(), ScriptedFeed::new([SNAPSHOT])).unwrap();

    assert!(book.is_initialized());
    assert_eq!(book.product_id(), "BTC-USD");
    assert_eq!(book.bids().get(dec!(100)), Some(dec!(1)));
    assert_eq!(book.bids().get(dec!(99)), Some(dec!(2)));
    assert_eq!(book.asks().get(dec!(101)), Some(dec!(1)));

    assert_eq!(book.best_bid(), Some(PriceLevel::new(dec!(100), dec!(1))));
    assert_eq!(book.best_ask(), Some(PriceLevel::new(dec!(101), dec!(1))));
    assert_eq!(book.spread(), Some(dec!(1)));
    assert_eq!(book.mid_price(), Some(dec!(100.5)));

    book.shutdown().unwrap();
}

/// Test deltas after the snapshot remove and overwrite levels
#[test]
fn test_deltas_apply_in_order() {
    init_logger();
    let feed = ScriptedFeed::new([
        SNAPSHOT.to_string(),
        l2update("buy", "100", "0"),
        l2update("sell", "101", "5"),
        l2update("buy", "98", "4"),
    ]);
    let book = OrderBook::with_transport(test_config(), feed).unwrap();

    assert!(wait_for(Duration::from_secs(5), || book.stats().updates() == 3));

    assert_eq!(book.bids().get(dec!(100)), None);
    assert_eq!(book.asks().get(dec!(101)), Some(dec!(5)));

    let snapshot = book.snapshot();
    assert_eq!(
        snapshot.bids,
        vec![
            PriceLevel::new(dec!(99), dec!(2)),
            PriceLevel::new(dec!(98), dec!(4))
        ]
    );
    assert_eq!(snapshot.best_ask(), Some(PriceLevel::new(dec!(101), dec!(5))));
    assert_eq!(book.queue_len(), 0);

    book.shutdown().unwrap();
}

/// Test a malformed payload is skipped and reported, and later ones still apply
#[test]
fn test_malformed_message_is_skipped() {
    init_logger();
    let feed = ScriptedFeed::new([
        SNAPSHOT.to_string(),
        r#"{"type":"l2update","changes":[["buy","oops","1"]]}"#.to_string(),
        "}{".to_string(),
        l2update("sell", "101", "5"),
    ]);
    let book = OrderBook::with_transport(test_config(), feed).unwrap();

    assert!(wait_for(Duration::from_secs(5), || book.stats().updates() == 1));
    assert_eq!(book.asks().get(dec!(101)), Some(dec!(5)));
    assert_eq!(book.stats().decode_failures(), 2);

    let events: Vec<_> = book.events().try_iter().collect();
    assert_eq!(events[0], BookEvent::Initialized);
    let decode_failures = events
        .iter()
        .filter(|e| matches!(e, BookEvent::DecodeFailed { .. }))
        .count();
    assert_eq!(decode_failures, 2);

    book.shutdown().unwrap();
}

/// Test a negative size never reaches the book and counts as a decode failure
#[test]
fn test_negative_size_is_rejected() {
    init_logger();
    let feed = ScriptedFeed::new([
        SNAPSHOT.to_string(),
        l2update("buy", "97", "-3"),
        l2update("sell", "101", "5"),
    ]);
    let book = OrderBook::with_transport(test_config(), feed).unwrap();

    assert!(wait_for(Duration::from_secs(5), || book.stats().updates() == 1));
    assert_eq!(book.bids().get(dec!(97)), None);
    assert_eq!(book.stats().decode_failures(), 1);
    assert_eq!(book.asks().get(dec!(101)), Some(dec!(5)));
    assert!(
        book.bids()
            .ascending()
            .iter()
            .all(|level| level.quantity > Decimal::ZERO)
    );

    book.shutdown().unwrap();
}

/// Test the second snapshot merges by default
#[test]
fn test_second_snapshot_merges() {
    init_logger();
    let second = r#"{"type":"snapshot","bids":[["98","7"]],"asks":[]}"#;
    let book = OrderBook::with_transport(test_config(), ScriptedFeed::new([SNAPSHOT, second]))
        .unwrap();

    assert!(wait_for(Duration::from_secs(5), || book.stats().snapshots() == 2));
    assert_eq!(book.bids().len(), 3);
    assert_eq!(book.asks().get(dec!(101)), Some(dec!(1)));

    book.shutdown().unwrap();
}

/// Test the replace policy clears both sides before a later snapshot
#[test]
fn test_second_snapshot_replaces_with_policy() {
    init_logger();
    let second = r#"{"type":"snapshot","bids":[["98","7"]],"asks":[]}"#;
    let config = test_config().with_snapshot_policy(SnapshotPolicy::Replace);
    let book = OrderBook::with_transport(config, ScriptedFeed::new([SNAPSHOT, second])).unwrap();

    assert!(wait_for(Duration::from_secs(5), || book.stats().snapshots() == 2));
    assert_eq!(book.bids().ascending(), vec![PriceLevel::new(dec!(98), dec!(7))]);
    assert!(book.asks().is_empty());

    book.shutdown().unwrap();
}

/// Test the subscription request carries the configured product and channel
#[test]
fn test_subscribes_to_configured_product() {
    init_logger();
    let snapshot = SNAPSHOT.replace("BTC-USD", "ETH-USD");
    let feed = ScriptedFeed::new([snapshot]);
    let requests = feed.request_log();

    let book = OrderBook::with_transport(BookConfig::new("ETH-USD"), feed).unwrap();

    let requests = requests.lock().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].product_ids, vec!["ETH-USD".to_string()]);
    assert_eq!(requests[0].channels, vec!["level2".to_string()]);
    assert_eq!(book.product_id(), "ETH-USD");

    book.shutdown().unwrap();
}

/// Test construction fails when no snapshot arrives in time
#[test]
fn test_init_timeout() {
    init_logger();
    let config = test_config().with_init_timeout(Some(Duration::from_millis(100)));
    let feed = ScriptedFeed::new([r#"{"type":"heartbeat"}"#]);

    let started = Instant::now();
    let result = OrderBook::with_transport(config, feed);

    assert!(matches!(result, Err(BookError::InitTimeout(_))));
    // Workers were torn down on the way out
    assert!(started.elapsed() < Duration::from_secs(2));
}

/// Test a transport failure before the snapshot fails construction
#[test]
fn test_transport_failure_before_snapshot() {
    init_logger();
    let feed = ScriptedFeed::new([r#"{"type":"subscriptions","channels":[]}"#])
        .failing_with("connection reset");

    let result = OrderBook::with_transport(test_config(), feed);

    match result {
        Err(BookError::Transport(TransportError::Closed(reason))) => {
            assert_eq!(reason, "connection reset");
        }
        Err(e) => panic!("Unexpected error: {}", e),
        Ok(_) => panic!("Expected construction to fail"),
    }
}

/// Test a transport failure after the snapshot freezes the book and is reported
#[test]
fn test_transport_failure_after_snapshot() {
    init_logger();
    let feed = ScriptedFeed::new([SNAPSHOT]).failing_with("connection reset");
    let book = OrderBook::with_transport(test_config(), feed).unwrap();

    let events = book.events().clone();
    let mut seen = Vec::new();
    assert!(wait_for(Duration::from_secs(5), || {
        seen.extend(events.try_iter());
        seen.contains(&BookEvent::ApplierStopped)
    }));
    assert!(seen.contains(&BookEvent::TransportFailed(
        "Connection closed by peer: connection reset".to_string()
    )));

    // The last applied state stays readable
    assert_eq!(book.bids().get(dec!(100)), Some(dec!(1)));
    book.shutdown().unwrap();
}

/// Test an invalid config is rejected before any thread starts
#[test]
fn test_invalid_config_rejected() {
    let result = OrderBook::with_transport(BookConfig::new(""), ScriptedFeed::new([SNAPSHOT]));
    assert!(matches!(result, Err(BookError::Config(_))));
}

/// Test shutdown stops both workers quickly once the feed goes quiet
#[test]
fn test_shutdown_is_bounded() {
    init_logger();
    let book = OrderBook::with_transport(test_config(), ScriptedFeed::new([SNAPSHOT])).unwrap();
    let events = book.events().clone();

    let started = Instant::now();
    book.shutdown().unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));

    let seen: Vec<_> = events.try_iter().collect();
    assert!(seen.contains(&BookEvent::TransportStopped));
    assert!(seen.contains(&BookEvent::ApplierStopped));
}

/// Transport writing an endless stream of deltas over a fixed price range.
/// Every quantity encodes its price: `generation * 1000 + price`.
struct FirehoseFeed {
    exited: Arc<AtomicBool>,
}

const FIREHOSE_PRICES: u32 = 20;

impl FeedTransport for FirehoseFeed {
    fn name(&self) -> &str {
        "firehose"
    }

    fn run(
        &mut self,
        _request: &SubscribeRequest,
        sink: &mut dyn FeedSink,
        stop: &StopSignal,
    ) -> Result<(), TransportError> {
        // Ends with SinkClosed when a bounded queue is full at shutdown
        let result = stream_deltas(sink, stop);
        self.exited.store(true, Ordering::SeqCst);
        result
    }
}

fn stream_deltas(sink: &mut dyn FeedSink, stop: &StopSignal) -> Result<(), TransportError> {
    let levels: Vec<String> = (1..=FIREHOSE_PRICES)
        .map(|p| format!(r#"["{}","{}"]"#, p, 1000 + p))
        .collect();
    sink.on_message(format!(
        r#"{{"type":"snapshot","bids":[{}],"asks":[{}]}}"#,
        levels.join(","),
        levels.join(",")
    ))?;

    let mut generation = 2u64;
    while !stop.is_raised() {
        for price in 1..=FIREHOSE_PRICES {
            let side = if price % 2 == 0 { "buy" } else { "sell" };
            // Every third generation removes the level instead
            let quantity = if generation % 3 == 0 {
                0
            } else {
                generation * 1000 + u64::from(price)
            };
            sink.on_message(l2update(side, &price.to_string(), &quantity.to_string()))?;
        }
        generation += 1;
        if generation % 64 == 0 {
            thread::yield_now();
        }
    }
    Ok(())
}

fn assert_consistent(level: PriceLevel) {
    assert!(level.quantity > Decimal::ZERO, "zero quantity stored: {:?}", level);
    assert_eq!(
        level.quantity % dec!(1000),
        level.price,
        "price and quantity from different writes: {:?}",
        level
    );
}

/// Test readers never observe a price paired with another write's quantity
#[test]
fn test_concurrent_readers_see_consistent_pairs() {
    init_logger();
    let exited = Arc::new(AtomicBool::new(false));
    let feed = FirehoseFeed {
        exited: Arc::clone(&exited),
    };
    let config = test_config().with_queue_capacity(Some(4096));
    let book = OrderBook::with_transport(config, feed).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|i| {
            let bids = book.bids().clone();
            let asks = book.asks().clone();
            thread::spawn(move || {
                let mut observed = 0usize;
                let deadline = Instant::now() + Duration::from_millis(300);
                while Instant::now() < deadline {
                    let side = if i % 2 == 0 { &bids } else { &asks };
                    for level in side.ascending() {
                        assert_consistent(level);
                        observed += 1;
                    }
                    if let Some(best) = side.best() {
                        assert_consistent(best);
                    }
                    for price in 1..=FIREHOSE_PRICES {
                        if let Some(quantity) = side.get(Decimal::from(price)) {
                            assert_consistent(PriceLevel::new(Decimal::from(price), quantity));
                        }
                    }
                }
                observed
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
    assert!(book.stats().updates() > 0);

    book.shutdown().unwrap();
    assert!(exited.load(Ordering::SeqCst));
}

/// Test dropping the book without shutdown still stops the workers
#[test]
fn test_drop_tears_down_workers() {
    init_logger();
    let exited = Arc::new(AtomicBool::new(false));
    let feed = FirehoseFeed {
        exited: Arc::clone(&exited),
    };
    let book = OrderBook::with_transport(test_config().with_queue_capacity(Some(256)), feed)
        .unwrap();

    drop(book);
    assert!(exited.load(Ordering::SeqCst));
}
