use l2book_feed::DEFAULT_FEED_URL;
use l2book_feed::messages::LEVEL2_CHANNEL;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a snapshot does to levels already in the book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotPolicy {
    /// Upsert the snapshot's levels over whatever is there
    #[default]
    Merge,
    /// Clear both sides before applying the snapshot
    Replace,
}

/// Configuration for one order book mirror
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookConfig {
    /// Product to mirror, e.g. "BTC-USD"
    #[serde(default = "default_product_id")]
    pub product_id: String,
    /// WebSocket feed URL
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    /// Feed channel to subscribe to
    #[serde(default = "default_channel")]
    pub channel: String,
    /// How long construction waits for the first snapshot; `null` waits forever
    #[serde(default = "default_init_timeout")]
    pub init_timeout_ms: Option<u64>,
    /// WebSocket connect timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Longest the applier waits on an empty queue before re-checking for stop
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Ingest queue capacity; `null` is unbounded, a value adds backpressure
    #[serde(default)]
    pub queue_capacity: Option<usize>,
    /// Merge or replace on snapshots after the first
    #[serde(default)]
    pub snapshot_policy: SnapshotPolicy,
    /// Buffered lifecycle events before new ones are dropped
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for BookConfig {
    fn default() -> Self {
        BookConfig {
            product_id: default_product_id(),
            feed_url: default_feed_url(),
            channel: default_channel(),
            init_timeout_ms: default_init_timeout(),
            connect_timeout_ms: default_connect_timeout(),
            poll_interval_ms: default_poll_interval(),
            queue_capacity: None,
            snapshot_policy: SnapshotPolicy::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl BookConfig {
    pub fn new(product_id: impl Into<String>) -> Self {
        BookConfig {
            product_id: product_id.into(),
            ..Default::default()
        }
    }

    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }

    pub fn with_init_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.init_timeout_ms = timeout.map(saturating_millis);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = saturating_millis(interval);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_snapshot_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.snapshot_policy = policy;
        self
    }

    pub fn init_timeout(&self) -> Option<Duration> {
        self.init_timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// Default value functions for serde
fn default_product_id() -> String {
    "BTC-USD".to_string()
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_channel() -> String {
    LEVEL2_CHANNEL.to_string()
}

fn default_init_timeout() -> Option<u64> {
    Some(30_000)
}

fn default_connect_timeout() -> u64 {
    10_000
}

fn default_poll_interval() -> u64 {
    50
}

fn default_event_capacity() -> usize {
    1024
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
