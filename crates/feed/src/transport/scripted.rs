//! Scripted transport - replays a fixed list of payloads in-process
//!
//! Stands in for the exchange connection in tests and local runs. After the
//! script is delivered the transport either idles until stopped (like a quiet
//! but healthy connection) or fails (like a dropped connection).

use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use super::{FeedSink, FeedTransport, StopSignal};
use crate::error::TransportError;
use crate::messages::SubscribeRequest;

/// What the transport does once every scripted payload has been delivered
#[derive(Debug, Clone, PartialEq, Eq)]
enum AfterScript {
    /// Stay connected until stopped
    Idle,
    /// Drop the connection with the given reason
    Fail(String),
}

/// In-process transport delivering a fixed script
pub struct ScriptedFeed {
    payloads: Vec<String>,
    interval: Option<Duration>,
    after: AfterScript,
    requests: Arc<Mutex<Vec<SubscribeRequest>>>,
}

impl ScriptedFeed {
    pub fn new<I, S>(payloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedFeed {
            payloads: payloads.into_iter().map(Into::into).collect(),
            interval: None,
            after: AfterScript::Idle,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pause between consecutive payloads
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Fail with `TransportError::Closed(reason)` after the script
    pub fn failing_with(mut self, reason: impl Into<String>) -> Self {
        self.after = AfterScript::Fail(reason.into());
        self
    }

    /// Subscription requests received by `run`, shared with the caller
    pub fn request_log(&self) -> Arc<Mutex<Vec<SubscribeRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl FeedTransport for ScriptedFeed {
    fn name(&self) -> &str {
        "scripted-feed"
    }

    fn run(
        &mut self,
        request: &SubscribeRequest,
        sink: &mut dyn FeedSink,
        stop: &StopSignal,
    ) -> Result<(), TransportError> {
        self.requests.lock().push(request.clone());

        for (i, payload) in self.payloads.iter().enumerate() {
            if stop.is_raised() {
                debug!("Script stopped after {} of {} payloads", i, self.payloads.len());
                return Ok(());
            }
            if let Some(interval) = self.interval
                && i > 0
                && stop.wait_timeout(interval)
            {
                return Ok(());
            }
            sink.on_message(payload.clone())?;
        }

        match &self.after {
            AfterScript::Idle => {
                stop.wait();
                Ok(())
            }
            AfterScript::Fail(reason) => Err(TransportError::Closed(reason.clone())),
        }
    }
}
