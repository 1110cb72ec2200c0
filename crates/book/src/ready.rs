//! Readiness latch: lets the constructor block until the first snapshot

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::BookError;

enum LatchState {
    Pending,
    Ready,
    /// The error is handed to the first waiter that observes it
    Failed(Option<BookError>),
}

/// One-shot latch opened by the applier, or failed by a dying worker
#[derive(Clone)]
pub(crate) struct ReadyLatch {
    inner: Arc<(Mutex<LatchState>, Condvar)>,
}

impl ReadyLatch {
    pub(crate) fn new() -> Self {
        ReadyLatch {
            inner: Arc::new((Mutex::new(LatchState::Pending), Condvar::new())),
        }
    }

    /// Open the latch. No effect once failed.
    pub(crate) fn open(&self) {
        let (state, cond) = &*self.inner;
        let mut state = state.lock();
        if matches!(*state, LatchState::Pending) {
            *state = LatchState::Ready;
            cond.notify_all();
        }
    }

    /// Fail the latch. No effect once open or already failed.
    pub(crate) fn fail(&self, error: BookError) {
        let (state, cond) = &*self.inner;
        let mut state = state.lock();
        if matches!(*state, LatchState::Pending) {
            *state = LatchState::Failed(Some(error));
            cond.notify_all();
        }
    }

    /// Block until opened or failed, or until `timeout` (`None` waits forever)
    pub(crate) fn wait(&self, timeout: Option<Duration>) -> Result<(), BookError> {
        let (state, cond) = &*self.inner;
        let started = Instant::now();
        let mut state = state.lock();

        loop {
            match &mut *state {
                LatchState::Ready => return Ok(()),
                LatchState::Failed(error) => {
                    return Err(error.take().unwrap_or(BookError::WorkerStopped("unknown")));
                }
                LatchState::Pending => {}
            }

            match timeout {
                Some(timeout) => {
                    if cond.wait_until(&mut state, started + timeout).timed_out()
                        && matches!(*state, LatchState::Pending)
                    {
                        return Err(BookError::InitTimeout(timeout));
                    }
                }
                None => cond.wait(&mut state),
            }
        }
    }
}
