mod price_level;
mod side;

pub use price_level::PriceLevel;
pub use side::Side;
