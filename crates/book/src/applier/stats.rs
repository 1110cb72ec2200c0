use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the applier thread, readable from any thread
#[derive(Debug, Default)]
pub struct ApplierStats {
    snapshots: AtomicU64,
    updates: AtomicU64,
    changes: AtomicU64,
    ignored: AtomicU64,
    decode_failures: AtomicU64,
}

impl ApplierStats {
    pub(crate) fn record_snapshot(&self) {
        self.snapshots.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_update(&self, changes: usize) {
        self.updates.fetch_add(1, Ordering::Relaxed);
        self.changes.fetch_add(changes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshots applied
    pub fn snapshots(&self) -> u64 {
        self.snapshots.load(Ordering::Relaxed)
    }

    /// l2update messages applied
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    /// Individual level changes applied across all updates
    pub fn changes(&self) -> u64 {
        self.changes.load(Ordering::Relaxed)
    }

    /// Messages decoded but not applied (other types, other products)
    pub fn ignored(&self) -> u64 {
        self.ignored.load(Ordering::Relaxed)
    }

    /// Messages skipped because they could not be decoded
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures.load(Ordering::Relaxed)
    }

    /// Every message taken off the queue
    pub fn messages(&self) -> u64 {
        self.snapshots() + self.updates() + self.ignored() + self.decode_failures()
    }
}
