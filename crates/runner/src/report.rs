//! Top-of-book reporting

use l2book::{BookEvent, OrderBook, PriceLevel};
use log::{info, warn};
use rust_decimal::Decimal;
use std::fmt;

/// Best levels and depth of one book at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopOfBook {
    pub product_id: String,
    pub best_bid: Option<PriceLevel>,
    pub best_ask: Option<PriceLevel>,
    pub bid_levels: usize,
    pub ask_levels: usize,
    pub queued: usize,
}

impl TopOfBook {
    pub fn capture(book: &OrderBook) -> Self {
        TopOfBook {
            product_id: book.product_id().to_string(),
            best_bid: book.best_bid(),
            best_ask: book.best_ask(),
            bid_levels: book.bids().len(),
            ask_levels: book.asks().len(),
            queued: book.queue_len(),
        }
    }

    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask?.price - self.best_bid?.price)
    }
}

impl fmt::Display for TopOfBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = |level: Option<PriceLevel>| match level {
            Some(l) => format!("{} x {}", l.price, l.quantity),
            None => "-".to_string(),
        };
        write!(
            f,
            "{} bid {} | ask {} | spread {} | levels {}/{} | queued {}",
            self.product_id,
            level(self.best_bid),
            level(self.best_ask),
            self.spread().map_or_else(|| "-".to_string(), |s| s.to_string()),
            self.bid_levels,
            self.ask_levels,
            self.queued
        )
    }
}

/// Log every pending book event; returns true once the feed is gone
pub fn log_events(book: &OrderBook) -> bool {
    let mut feed_gone = false;
    for event in book.events().try_iter() {
        match event {
            BookEvent::Initialized => info!("Book initialized"),
            BookEvent::FeedError { message, reason } => {
                warn!("Feed error: {} {}", message, reason.unwrap_or_default())
            }
            BookEvent::DecodeFailed { error, payload } => {
                warn!("Skipped message ({}): {}", error, payload)
            }
            BookEvent::TransportStopped => info!("Transport stopped"),
            BookEvent::TransportFailed(e) => {
                warn!("Transport failed, book is frozen: {}", e);
                feed_gone = true;
            }
            BookEvent::ApplierStopped => {
                info!("Applier stopped");
                feed_gone = true;
            }
        }
    }
    feed_gone
}
