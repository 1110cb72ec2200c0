use rust_decimal::Decimal;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Quantity value - uses Decimal for precision.
/// Zero means "no resting size" and is never stored in a book side.
pub type Quantity = Decimal;

/// Product identifier on the feed, e.g. `BTC-USD`
pub type ProductId = String;
