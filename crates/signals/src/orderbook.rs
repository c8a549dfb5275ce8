//! Order book liquidity: best prices, spread and depth imbalance.

use serde::Serialize;

use market_report_core::{checked_div, BookConfig, EngineError, OrderBookSnapshot, PriceLevel};

/// Book side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Bid side (buy orders)
    Bid,
    /// Ask side (sell orders)
    Ask,
}

/// A reported level with its share of the side's top-N depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BookLevel {
    pub price: f64,
    pub quantity: f64,
    pub share_pct: f64,
}

/// Liquidity metrics for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBookAnalysis {
    pub best_bid: f64,
    pub best_ask: f64,
    pub mid: f64,
    pub spread: f64,
    pub spread_pct: f64,
    /// Bid quantity over the top-N levels
    pub bid_depth: f64,
    /// Ask quantity over the top-N levels
    pub ask_depth: f64,
    /// (bid - ask) / (bid + ask), within [-1, 1]
    pub imbalance: f64,
    /// Top-N bids by quantity, highest price first
    pub top_bids: Vec<BookLevel>,
    /// Top-N asks by quantity, lowest price first
    pub top_asks: Vec<BookLevel>,
}

impl OrderBookAnalysis {
    /// Side holding more top-N depth, `None` when balanced.
    #[must_use]
    pub fn dominant_side(&self) -> Option<Side> {
        if self.imbalance > 0.0 {
            Some(Side::Bid)
        } else if self.imbalance < 0.0 {
            Some(Side::Ask)
        } else {
            None
        }
    }
}

/// Depth imbalance `(bid - ask) / (bid + ask)`, 0 when both are empty.
#[must_use]
pub fn depth_imbalance(bid_quantity: f64, ask_quantity: f64) -> f64 {
    let total = bid_quantity + ask_quantity;
    if total == 0.0 {
        return 0.0;
    }
    ((bid_quantity - ask_quantity) / total).clamp(-1.0, 1.0)
}

/// Computes [`OrderBookAnalysis`] over the top-N levels by quantity.
#[derive(Debug, Clone, Copy)]
pub struct OrderBookAnalyzer {
    top_levels: usize,
}

impl Default for OrderBookAnalyzer {
    fn default() -> Self {
        Self::from_config(&BookConfig::default())
    }
}

impl OrderBookAnalyzer {
    #[must_use]
    pub fn new(top_levels: usize) -> Self {
        Self {
            top_levels: top_levels.max(1),
        }
    }

    #[must_use]
    pub fn from_config(config: &BookConfig) -> Self {
        Self::new(config.top_levels)
    }

    /// # Errors
    /// `InsufficientData` when either side is empty, `ComputationError`
    /// when the mid price is zero.
    pub fn analyze(&self, book: &OrderBookSnapshot) -> Result<OrderBookAnalysis, EngineError> {
        if book.is_one_sided() {
            return Err(EngineError::insufficient(
                "order book (both sides required)",
                1,
                book.bids.len().min(book.asks.len()),
            ));
        }

        let best_bid = book
            .bids
            .iter()
            .map(|l| l.price)
            .fold(f64::NEG_INFINITY, f64::max);
        let best_ask = book
            .asks
            .iter()
            .map(|l| l.price)
            .fold(f64::INFINITY, f64::min);

        let mid = (best_bid + best_ask) / 2.0;
        let spread = best_ask - best_bid;
        let spread_pct = checked_div("spread %", spread, mid)? * 100.0;

        let top_bids = self.top_by_quantity(&book.bids, Side::Bid);
        let top_asks = self.top_by_quantity(&book.asks, Side::Ask);
        let bid_depth: f64 = top_bids.iter().map(|l| l.quantity).sum();
        let ask_depth: f64 = top_asks.iter().map(|l| l.quantity).sum();
        let imbalance = depth_imbalance(bid_depth, ask_depth);

        tracing::debug!(best_bid, best_ask, spread, imbalance, "analyzed order book");

        Ok(OrderBookAnalysis {
            best_bid,
            best_ask,
            mid,
            spread,
            spread_pct,
            bid_depth,
            ask_depth,
            imbalance,
            top_bids: with_shares(top_bids, bid_depth),
            top_asks: with_shares(top_asks, ask_depth),
        })
    }

    fn top_by_quantity(&self, levels: &[PriceLevel], side: Side) -> Vec<PriceLevel> {
        let by_price = |a: &PriceLevel, b: &PriceLevel| match side {
            Side::Bid => b.price.total_cmp(&a.price),
            Side::Ask => a.price.total_cmp(&b.price),
        };

        let mut top = levels.to_vec();
        top.sort_by(|a, b| {
            b.quantity
                .total_cmp(&a.quantity)
                .then_with(|| by_price(a, b))
        });
        top.truncate(self.top_levels);
        top.sort_by(|a, b| by_price(a, b).then_with(|| b.quantity.total_cmp(&a.quantity)));
        top
    }
}

fn with_shares(levels: Vec<PriceLevel>, side_total: f64) -> Vec<BookLevel> {
    levels
        .into_iter()
        .map(|l| BookLevel {
            price: l.price,
            quantity: l.quantity,
            share_pct: if side_total == 0.0 {
                0.0
            } else {
                l.quantity / side_total * 100.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_report_core::ErrorKind;

    fn scenario_c() -> OrderBookSnapshot {
        OrderBookSnapshot::from_pairs(&[(100.0, 5.0), (99.0, 3.0)], &[(101.0, 2.0), (102.0, 1.0)])
    }

    #[test]
    fn best_prices_spread_and_imbalance() {
        let a = OrderBookAnalyzer::default().analyze(&scenario_c()).unwrap();
        assert_eq!(a.best_bid, 100.0);
        assert_eq!(a.best_ask, 101.0);
        assert_eq!(a.mid, 100.5);
        assert_eq!(a.spread, 1.0);
        assert!((a.imbalance - 5.0 / 11.0).abs() < 1e-12);
        assert!((a.imbalance - 0.4545).abs() < 1e-4);
        assert_eq!(a.dominant_side(), Some(Side::Bid));
    }

    #[test]
    fn best_prices_do_not_rely_on_ordering() {
        let book = OrderBookSnapshot::from_pairs(
            &[(99.0, 3.0), (100.0, 5.0)],
            &[(102.0, 1.0), (101.0, 2.0)],
        );
        let a = OrderBookAnalyzer::default().analyze(&book).unwrap();
        assert_eq!(a.best_bid, 100.0);
        assert_eq!(a.best_ask, 101.0);
    }

    #[test]
    fn shares_sum_to_hundred() {
        let a = OrderBookAnalyzer::default().analyze(&scenario_c()).unwrap();
        assert!((a.top_bids[0].share_pct - 62.5).abs() < 1e-12);
        let total: f64 = a.top_asks.iter().map(|l| l.share_pct).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn equal_depth_is_zero_imbalance() {
        let book = OrderBookSnapshot::from_pairs(&[(10.0, 4.0)], &[(11.0, 4.0)]);
        let a = OrderBookAnalyzer::default().analyze(&book).unwrap();
        assert_eq!(a.imbalance, 0.0);
        assert_eq!(a.dominant_side(), None);
    }

    #[test]
    fn zero_quantity_book_is_zero_imbalance() {
        assert_eq!(depth_imbalance(0.0, 0.0), 0.0);
    }

    #[test]
    fn top_levels_are_selected_by_quantity() {
        let book = OrderBookSnapshot::from_pairs(
            &[(100.0, 1.0), (99.0, 9.0), (98.0, 5.0)],
            &[(101.0, 1.0), (102.0, 1.0)],
        );
        let a = OrderBookAnalyzer::new(2).analyze(&book).unwrap();
        let prices: Vec<f64> = a.top_bids.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![99.0, 98.0]);
        assert_eq!(a.bid_depth, 14.0);
        // best bid still comes from the full side
        assert_eq!(a.best_bid, 100.0);
    }

    #[test]
    fn empty_side_is_insufficient() {
        let book = OrderBookSnapshot::from_pairs(&[(100.0, 1.0)], &[]);
        let err = OrderBookAnalyzer::default().analyze(&book).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }
}
