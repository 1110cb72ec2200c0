//! WebSocket transport for the exchange feed

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, trace, warn};
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{FeedSink, FeedTransport, StopSignal};
use crate::error::TransportError;
use crate::messages::SubscribeRequest;

/// Default exchange feed endpoint
pub const DEFAULT_FEED_URL: &str = "wss://ws-feed.exchange.coinbase.com";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// WebSocket client for the streaming market data feed
///
/// Runs its own current-thread tokio runtime on the calling thread, so the
/// socket is read by exactly one OS thread and every text frame is handed to
/// the sink synchronously, in arrival order. No reconnect is attempted: any
/// connection failure ends `run` with an error.
pub struct WsFeed {
    url: String,
    connect_timeout: Duration,
}

impl WsFeed {
    pub fn new(url: impl Into<String>) -> Self {
        WsFeed {
            url: url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn stream(
        &self,
        request: &SubscribeRequest,
        sink: &mut dyn FeedSink,
        stop: &StopSignal,
    ) -> Result<(), TransportError> {
        let connect = tokio::time::timeout(self.connect_timeout, connect_async(self.url.as_str()));
        let ws_stream = tokio::select! {
            biased;

            _ = stop.raised() => {
                debug!("Stop requested while connecting to {}", self.url);
                return Ok(());
            }
            result = connect => match result {
                Ok(connected) => connected?.0,
                Err(_) => return Err(TransportError::Timeout(self.url.clone())),
            },
        };
        info!("Connected to {}", self.url);

        let (mut write, mut read) = ws_stream.split();

        write.send(Message::Text(request.to_json()?.into())).await?;
        info!(
            "Subscribed to {:?} on channels {:?}",
            request.product_ids, request.channels
        );

        loop {
            tokio::select! {
                biased;

                _ = stop.raised() => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        debug!("Close frame not sent: {}", e);
                    }
                    info!("Disconnected from {}", self.url);
                    return Ok(());
                }
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        sink.on_message(text.as_str().to_owned())?;
                    }
                    Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                        Ok(text) => sink.on_message(text)?,
                        Err(_) => warn!("Dropping non UTF-8 binary frame ({} bytes)", data.len()),
                    },
                    Some(Ok(Message::Ping(data))) => {
                        trace!("Received ping: {:?}", data);
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|f| format!("{} {}", u16::from(f.code), &*f.reason))
                            .unwrap_or_else(|| "no close frame".to_string());
                        return Err(TransportError::Closed(reason));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Err(TransportError::Closed("stream ended".to_string())),
                }
            }
        }
    }
}

impl FeedTransport for WsFeed {
    fn name(&self) -> &str {
        "ws-feed"
    }

    fn run(
        &mut self,
        request: &SubscribeRequest,
        sink: &mut dyn FeedSink,
        stop: &StopSignal,
    ) -> Result<(), TransportError> {
        // Another component may already have installed a provider
        let _ = rustls::crypto::ring::default_provider().install_default();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        runtime.block_on(self.stream(request, sink, stop))
    }
}
