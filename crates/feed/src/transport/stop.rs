//! Cooperative stop signal shared between the owner and a worker

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// One-shot, clone-able stop flag
///
/// Raised once by the owner; observed by polling ([`is_raised`]), by blocking
/// ([`wait`], [`wait_timeout`]) or from async code ([`raised`]).
///
/// [`is_raised`]: StopSignal::is_raised
/// [`wait`]: StopSignal::wait
/// [`wait_timeout`]: StopSignal::wait_timeout
/// [`raised`]: StopSignal::raised
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    raised: AtomicBool,
    lock: Mutex<()>,
    cond: Condvar,
    notify: Notify,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal and wake every waiter. Idempotent.
    pub fn raise(&self) {
        {
            let _guard = self.inner.lock.lock();
            self.inner.raised.store(true, Ordering::Release);
        }
        self.inner.cond.notify_all();
        self.inner.notify.notify_waiters();
    }

    pub fn is_raised(&self) -> bool {
        self.inner.raised.load(Ordering::Acquire)
    }

    /// Block the calling thread until the signal is raised
    pub fn wait(&self) {
        let mut guard = self.inner.lock.lock();
        while !self.is_raised() {
            self.inner.cond.wait(&mut guard);
        }
    }

    /// Block up to `timeout`; returns whether the signal is raised
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut guard = self.inner.lock.lock();
        if !self.is_raised() {
            self.inner.cond.wait_for(&mut guard, timeout);
        }
        self.is_raised()
    }

    /// Resolves once the signal is raised
    pub async fn raised(&self) {
        loop {
            // Register before checking the flag so a concurrent raise is not lost
            let notified = self.inner.notify.notified();
            if self.is_raised() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopSignal")
            .field("raised", &self.is_raised())
            .finish()
    }
}
