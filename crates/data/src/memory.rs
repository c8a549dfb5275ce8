//! In-memory candle source.

use std::collections::HashMap;

use async_trait::async_trait;

use market_report_core::{
    Candle, CandleSeries, CandleSource, EngineError, Interval, OrderBookSnapshot,
};

/// Candle source serving preloaded data.
///
/// Unknown symbols yield [`EngineError::InvalidSymbol`]; a known symbol
/// without data for the requested interval (or without a book) yields
/// [`EngineError::UpstreamUnavailable`]. A source built with
/// [`MemorySource::failing`] returns its error for every request.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    candles: HashMap<(String, Interval), Vec<Candle>>,
    books: HashMap<String, OrderBookSnapshot>,
    failure: Option<EngineError>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that fails every request with `error`.
    #[must_use]
    pub fn failing(error: EngineError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_candles(
        mut self,
        symbol: impl Into<String>,
        interval: Interval,
        candles: Vec<Candle>,
    ) -> Self {
        self.candles.insert((symbol.into(), interval), candles);
        self
    }

    #[must_use]
    pub fn with_book(mut self, symbol: impl Into<String>, book: OrderBookSnapshot) -> Self {
        self.books.insert(symbol.into(), book);
        self
    }

    fn knows(&self, symbol: &str) -> bool {
        self.books.contains_key(symbol) || self.candles.keys().any(|(s, _)| s == symbol)
    }

    fn check(&self, symbol: &str) -> Result<(), EngineError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        if !self.knows(symbol) {
            return Err(EngineError::InvalidSymbol(symbol.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CandleSource for MemorySource {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        count: usize,
    ) -> Result<CandleSeries, EngineError> {
        self.check(symbol)?;
        let candles = self
            .candles
            .get(&(symbol.to_string(), interval))
            .ok_or_else(|| EngineError::upstream(format!("no {interval} candles for {symbol}")))?;

        let skip = candles.len().saturating_sub(count);
        CandleSeries::new(interval, candles[skip..].to_vec())
    }

    async fn fetch_order_book(
        &self,
        symbol: &str,
        depth: usize,
    ) -> Result<OrderBookSnapshot, EngineError> {
        self.check(symbol)?;
        let book = self
            .books
            .get(symbol)
            .ok_or_else(|| EngineError::upstream(format!("no order book for {symbol}")))?;

        Ok(OrderBookSnapshot {
            bids: book.bids.iter().take(depth).copied().collect(),
            asks: book.asks.iter().take(depth).copied().collect(),
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{synthetic_book, synthetic_candles};
    use market_report_core::ErrorKind;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_candles(
                "BTCUSDT",
                Interval::OneHour,
                synthetic_candles(Interval::OneHour, 50, 100.0),
            )
            .with_book("BTCUSDT", synthetic_book(100.0, 50))
    }

    #[tokio::test]
    async fn test_returns_tail_of_candles() {
        let candles = synthetic_candles(Interval::OneHour, 50, 100.0);
        let series = source()
            .fetch_candles("BTCUSDT", Interval::OneHour, 10)
            .await
            .unwrap();
        assert_eq!(series.len(), 10);
        assert_eq!(series.candles(), &candles[40..]);
    }

    #[tokio::test]
    async fn test_short_history_is_returned_as_is() {
        let series = source()
            .fetch_candles("BTCUSDT", Interval::OneHour, 500)
            .await
            .unwrap();
        assert_eq!(series.len(), 50);
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let err = source()
            .fetch_candles("DOGEUSDT", Interval::OneHour, 10)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSymbol);
    }

    #[tokio::test]
    async fn test_missing_interval_is_upstream() {
        let err = source()
            .fetch_candles("BTCUSDT", Interval::OneMinute, 10)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn test_book_is_truncated_to_depth() {
        let book = source().fetch_order_book("BTCUSDT", 5).await.unwrap();
        assert_eq!(book.bids.len(), 5);
        assert_eq!(book.asks.len(), 5);
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = MemorySource::failing(EngineError::upstream("connection reset"));
        let err = source.fetch_order_book("BTCUSDT", 5).await.unwrap_err();
        assert_eq!(err, EngineError::upstream("connection reset"));
    }
}
