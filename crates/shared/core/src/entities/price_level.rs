use serde::{Deserialize, Serialize};

use crate::values::{Price, Quantity};

/// Aggregate resting size at one price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub quantity: Quantity,
}

impl PriceLevel {
    pub fn new(price: Price, quantity: Quantity) -> Self {
        PriceLevel { price, quantity }
    }

    /// A zero quantity means the level is absent from the book
    pub fn is_empty(&self) -> bool {
        self.quantity.is_zero()
    }
}

impl From<(Price, Quantity)> for PriceLevel {
    fn from((price, quantity): (Price, Quantity)) -> Self {
        PriceLevel { price, quantity }
    }
}

impl From<PriceLevel> for (Price, Quantity) {
    fn from(level: PriceLevel) -> Self {
        (level.price, level.quantity)
    }
}
