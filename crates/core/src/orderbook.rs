use serde::{Deserialize, Serialize};

/// Order book price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Price at this level
    pub price: f64,
    /// Quantity at this level
    pub quantity: f64,
}

impl PriceLevel {
    #[must_use]
    pub const fn new(price: f64, quantity: f64) -> Self {
        Self { price, quantity }
    }
}

impl From<(f64, f64)> for PriceLevel {
    fn from((price, quantity): (f64, f64)) -> Self {
        Self { price, quantity }
    }
}

/// Snapshot of an order book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Bid levels (highest price first)
    pub bids: Vec<PriceLevel>,
    /// Ask levels (lowest price first)
    pub asks: Vec<PriceLevel>,
}

impl OrderBookSnapshot {
    /// Builds a snapshot from `(price, quantity)` pairs.
    #[must_use]
    pub fn from_pairs(bids: &[(f64, f64)], asks: &[(f64, f64)]) -> Self {
        Self {
            bids: bids.iter().copied().map(PriceLevel::from).collect(),
            asks: asks.iter().copied().map(PriceLevel::from).collect(),
        }
    }

    /// Returns true if either side is empty.
    #[must_use]
    pub fn is_one_sided(&self) -> bool {
        self.bids.is_empty() || self.asks.is_empty()
    }
}
