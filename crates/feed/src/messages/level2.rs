//! Inbound `level2` channel messages
//!
//! Prices and sizes arrive as decimal strings. A payload is decoded in full
//! (every decimal parsed, every side validated) before it is handed to the
//! book, so a malformed message is rejected as a whole.

use l2book_core::{Price, PriceLevel, Quantity, Side};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use crate::error::DecodeError;

/// Full state of both sides, sent once after subscribing
#[derive(Debug, Clone, PartialEq)]
pub struct BookSnapshot {
    pub product_id: Option<String>,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

/// One changed level inside an `l2update`. Quantity zero means remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

impl Change {
    pub fn new(side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            side,
            price,
            quantity,
        }
    }

    /// Check if this change removes the level
    pub fn is_removal(&self) -> bool {
        self.quantity.is_zero()
    }
}

/// Incremental update: only the levels that changed since the last message
#[derive(Debug, Clone, PartialEq)]
pub struct BookUpdate {
    pub product_id: Option<String>,
    pub changes: Vec<Change>,
}

/// Decoded feed message
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Snapshot(BookSnapshot),
    Update(BookUpdate),
    /// Subscription acknowledgement
    Subscriptions,
    /// Error reported by the feed (e.g. rejected subscription)
    Error {
        message: String,
        reason: Option<String>,
    },
    /// Any other message type; never applied
    Other,
}

impl FeedMessage {
    /// Decode a raw text payload
    pub fn decode(payload: &str) -> Result<Self, DecodeError> {
        let wire: WireMessage = serde_json::from_str(payload)?;
        wire.try_into()
    }

    /// Message type name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            FeedMessage::Snapshot(_) => "snapshot",
            FeedMessage::Update(_) => "l2update",
            FeedMessage::Subscriptions => "subscriptions",
            FeedMessage::Error { .. } => "error",
            FeedMessage::Other => "other",
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireMessage {
    Snapshot {
        #[serde(default)]
        product_id: Option<String>,
        bids: Vec<[String; 2]>,
        asks: Vec<[String; 2]>,
    },
    L2update {
        #[serde(default)]
        product_id: Option<String>,
        changes: Vec<[String; 3]>,
    },
    Subscriptions {},
    Error {
        #[serde(default)]
        message: String,
        #[serde(default)]
        reason: Option<String>,
    },
    #[serde(other)]
    Other,
}

impl TryFrom<WireMessage> for FeedMessage {
    type Error = DecodeError;

    fn try_from(wire: WireMessage) -> Result<Self, DecodeError> {
        Ok(match wire {
            WireMessage::Snapshot {
                product_id,
                bids,
                asks,
            } => FeedMessage::Snapshot(BookSnapshot {
                product_id,
                bids: parse_levels(&bids)?,
                asks: parse_levels(&asks)?,
            }),
            WireMessage::L2update {
                product_id,
                changes,
            } => FeedMessage::Update(BookUpdate {
                product_id,
                changes: changes
                    .iter()
                    .map(parse_change)
                    .collect::<Result<_, _>>()?,
            }),
            WireMessage::Subscriptions {} => FeedMessage::Subscriptions,
            WireMessage::Error { message, reason } => FeedMessage::Error { message, reason },
            WireMessage::Other => FeedMessage::Other,
        })
    }
}

fn parse_levels(levels: &[[String; 2]]) -> Result<Vec<PriceLevel>, DecodeError> {
    levels
        .iter()
        .map(|[price, qty]| {
            Ok(PriceLevel::new(
                parse_decimal("price", price)?,
                parse_size(qty)?,
            ))
        })
        .collect()
}

fn parse_change([side, price, qty]: &[String; 3]) -> Result<Change, DecodeError> {
    let side = Side::from_str(side).map_err(DecodeError::UnknownSide)?;
    Ok(Change::new(
        side,
        parse_decimal("price", price)?,
        parse_size(qty)?,
    ))
}

/// Zero is a removal; anything below it has no meaning in the book
fn parse_size(value: &str) -> Result<Decimal, DecodeError> {
    let size = parse_decimal("size", value)?;
    if size.is_sign_negative() && !size.is_zero() {
        return Err(DecodeError::NegativeSize(value.to_string()));
    }
    Ok(size)
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, DecodeError> {
    Decimal::from_str(value).map_err(|_| DecodeError::InvalidDecimal {
        field,
        value: value.to_string(),
    })
}
