use anyhow::{Context, Result};
use csv::Writer;
use market_report_core::{Candle, OrderBookSnapshot};
use std::fs::File;
use std::path::Path;

use crate::csv_source::{BookFile, CandleRow};

pub struct CsvStorage;

impl CsvStorage {
    /// Writes candles to a CSV file readable by [`CsvCandleSource`](crate::CsvCandleSource)
    ///
    /// Format: open_time,open,high,low,close,volume
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_candles(path: &Path, candles: &[Candle]) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        // Oldest first, as the source expects
        let mut sorted = candles.to_vec();
        sorted.sort_by_key(|c| c.open_time);

        for candle in &sorted {
            writer
                .serialize(CandleRow::from(candle))
                .with_context(|| format!("Failed to write candle row to {}", path.display()))?;
        }

        writer.flush()?;
        tracing::debug!(path = %path.display(), rows = sorted.len(), "wrote candle fixture");
        Ok(())
    }

    /// Writes an order book snapshot as JSON `{"bids":[[p,q]],"asks":[[p,q]]}`.
    ///
    /// # Errors
    /// Returns error if file cannot be created or serialization fails
    pub fn write_book(path: &Path, book: &OrderBookSnapshot) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create book file: {}", path.display()))?;
        serde_json::to_writer_pretty(file, &BookFile::from(book))
            .with_context(|| format!("Failed to write order book to {}", path.display()))?;
        Ok(())
    }
}
