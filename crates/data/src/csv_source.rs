//! Offline candle source backed by fixture files.
//!
//! Layout of a fixture directory:
//!
//! ```text
//! BTCUSDT_15m.csv   open_time,open,high,low,close,volume
//! BTCUSDT_1h.csv
//! BTCUSDT_book.json {"bids":[[price,qty],...],"asks":[[price,qty],...]}
//! ```

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use market_report_core::{
    Candle, CandleSeries, CandleSource, EngineError, Interval, OrderBookSnapshot,
};

/// Path of the candle file for `symbol` at `interval`.
#[must_use]
pub fn candle_path(dir: &Path, symbol: &str, interval: Interval) -> PathBuf {
    dir.join(format!("{symbol}_{interval}.csv"))
}

/// Path of the order book file for `symbol`.
#[must_use]
pub fn book_path(dir: &Path, symbol: &str) -> PathBuf {
    dir.join(format!("{symbol}_book.json"))
}

/// One CSV row of a candle fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleRow {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl From<CandleRow> for Candle {
    fn from(row: CandleRow) -> Self {
        Self {
            open_time: row.open_time,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

impl From<&Candle> for CandleRow {
    fn from(candle: &Candle) -> Self {
        Self {
            open_time: candle.open_time,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
        }
    }
}

/// JSON shape of an order book fixture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookFile {
    pub bids: Vec<(f64, f64)>,
    pub asks: Vec<(f64, f64)>,
}

impl From<&OrderBookSnapshot> for BookFile {
    fn from(book: &OrderBookSnapshot) -> Self {
        Self {
            bids: book.bids.iter().map(|l| (l.price, l.quantity)).collect(),
            asks: book.asks.iter().map(|l| (l.price, l.quantity)).collect(),
        }
    }
}

/// Reads candles and order books from a fixture directory.
///
/// A missing file is reported as [`EngineError::InvalidSymbol`]; unreadable
/// or malformed files as [`EngineError::UpstreamUnavailable`].
#[derive(Debug, Clone)]
pub struct CsvCandleSource {
    dir: PathBuf,
}

impl CsvCandleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read(&self, path: &Path, symbol: &str) -> Result<Vec<u8>, EngineError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                Err(EngineError::InvalidSymbol(symbol.to_string()))
            }
            Err(e) => Err(EngineError::upstream(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }
}

/// Parses candle CSV bytes, oldest first.
///
/// # Errors
/// Returns [`EngineError::UpstreamUnavailable`] for malformed rows.
pub fn parse_candles(bytes: &[u8]) -> Result<Vec<Candle>, EngineError> {
    let mut reader = csv::Reader::from_reader(bytes);
    reader
        .deserialize::<CandleRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map(Candle::from)
                .map_err(|e| EngineError::upstream(format!("malformed candle row {}: {e}", i + 1)))
        })
        .collect()
}

#[async_trait]
impl CandleSource for CsvCandleSource {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        count: usize,
    ) -> Result<CandleSeries, EngineError> {
        let path = candle_path(&self.dir, symbol, interval);
        let bytes = self.read(&path, symbol).await?;
        let mut candles = parse_candles(&bytes)?;

        let skip = candles.len().saturating_sub(count);
        candles.drain(..skip);
        tracing::debug!(
            path = %path.display(),
            candles = candles.len(),
            "loaded candle fixture"
        );
        CandleSeries::new(interval, candles)
    }

    async fn fetch_order_book(
        &self,
        symbol: &str,
        depth: usize,
    ) -> Result<OrderBookSnapshot, EngineError> {
        let path = book_path(&self.dir, symbol);
        let bytes = self.read(&path, symbol).await?;
        let file: BookFile = serde_json::from_slice(&bytes).map_err(|e| {
            EngineError::upstream(format!("malformed order book {}: {e}", path.display()))
        })?;

        let bids: Vec<_> = file.bids.into_iter().take(depth).collect();
        let asks: Vec<_> = file.asks.into_iter().take(depth).collect();
        Ok(OrderBookSnapshot::from_pairs(&bids, &asks))
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_storage::CsvStorage;
    use crate::synthetic::{synthetic_book, synthetic_candles};
    use market_report_core::ErrorKind;

    const CSV: &str = "open_time,open,high,low,close,volume\n\
        2024-01-01T00:00:00Z,100,101,99,100.5,10\n\
        2024-01-01T00:15:00Z,100.5,102,100,101.5,12\n\
        2024-01-01T00:30:00Z,101.5,103,101,102,9\n";

    #[test]
    fn test_parse_candles() {
        let candles = parse_candles(CSV.as_bytes()).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].open, 100.0);
        assert_eq!(candles[2].close, 102.0);
        assert_eq!(candles[1].open_time.to_rfc3339(), "2024-01-01T00:15:00+00:00");
    }

    #[test]
    fn test_parse_candles_rejects_garbage() {
        let err = parse_candles(b"open_time,open,high,low,close,volume\nnope,1,2,3,4,5\n")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(err.to_string().contains("row 1"));
    }

    #[tokio::test]
    async fn test_fetch_returns_latest_candles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            candle_path(dir.path(), "BTCUSDT", Interval::FifteenMinutes),
            CSV,
        )
        .unwrap();

        let source = CsvCandleSource::new(dir.path());
        let series = source
            .fetch_candles("BTCUSDT", Interval::FifteenMinutes, 2)
            .await
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.candles()[0].open, 100.5);
        assert_eq!(series.interval(), Interval::FifteenMinutes);
    }

    #[tokio::test]
    async fn test_missing_fixture_is_invalid_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvCandleSource::new(dir.path());

        let err = source
            .fetch_candles("NOPE", Interval::OneHour, 10)
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidSymbol("NOPE".to_string()));

        let err = source.fetch_order_book("NOPE", 10).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSymbol);
    }

    #[tokio::test]
    async fn test_unordered_fixture_is_upstream_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            candle_path(dir.path(), "BTCUSDT", Interval::OneHour),
            "open_time,open,high,low,close,volume\n\
             2024-01-01T01:00:00Z,1,1,1,1,1\n\
             2024-01-01T00:00:00Z,1,1,1,1,1\n",
        )
        .unwrap();

        let err = CsvCandleSource::new(dir.path())
            .fetch_candles("BTCUSDT", Interval::OneHour, 10)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn test_storage_round_trip_through_source() {
        let dir = tempfile::tempdir().unwrap();
        let candles = synthetic_candles(Interval::OneHour, 48, 250.0);
        let book = synthetic_book(250.0, 30);

        CsvStorage::write_candles(
            &candle_path(dir.path(), "ETHUSDT", Interval::OneHour),
            &candles,
        )
        .unwrap();
        CsvStorage::write_book(&book_path(dir.path(), "ETHUSDT"), &book).unwrap();

        let source = CsvCandleSource::new(dir.path());
        let series = source
            .fetch_candles("ETHUSDT", Interval::OneHour, 100)
            .await
            .unwrap();
        assert_eq!(series.candles(), candles.as_slice());

        let loaded = source.fetch_order_book("ETHUSDT", 20).await.unwrap();
        assert_eq!(loaded.bids.len(), 20);
        assert_eq!(loaded.asks.len(), 20);
        assert_eq!(loaded.bids[0], book.bids[0]);
    }

    #[tokio::test]
    async fn test_malformed_book_is_upstream_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(book_path(dir.path(), "BTCUSDT"), "{\"bids\": 5}").unwrap();

        let err = CsvCandleSource::new(dir.path())
            .fetch_order_book("BTCUSDT", 10)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }
}
