use crate::candle::{CandleSeries, Interval};
use crate::error::EngineError;
use crate::orderbook::OrderBookSnapshot;
use async_trait::async_trait;

/// Supplier of raw market data for report generation.
///
/// Implementations own transport, authentication, timeouts and gap handling.
/// Errors are returned as-is to the caller of the report; the engine does not
/// retry.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetches the latest `count` candles for `symbol`, oldest first.
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        count: usize,
    ) -> Result<CandleSeries, EngineError>;

    /// Fetches an order book snapshot with up to `depth` levels per side.
    async fn fetch_order_book(
        &self,
        symbol: &str,
        depth: usize,
    ) -> Result<OrderBookSnapshot, EngineError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
