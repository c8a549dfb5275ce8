//! Binance REST response shapes and their conversion into core types.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use market_report_core::{Candle, OrderBookSnapshot, PriceLevel};

use crate::error::BinanceError;

/// Depth limits accepted by `/api/v3/depth`.
pub const DEPTH_LIMITS: [usize; 8] = [5, 10, 20, 50, 100, 500, 1000, 5000];

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}

/// `/api/v3/depth` response.
#[derive(Debug, Clone, Deserialize)]
pub struct DepthResponse {
    #[serde(rename = "lastUpdateId")]
    pub last_update_id: u64,
    pub bids: Vec<[String; 2]>,
    pub asks: Vec<[String; 2]>,
}

impl DepthResponse {
    /// Converts into a snapshot keeping at most `depth` levels per side.
    ///
    /// # Errors
    /// Returns [`BinanceError::Parse`] if a price or quantity is not numeric.
    pub fn into_snapshot(self, depth: usize) -> Result<OrderBookSnapshot, BinanceError> {
        Ok(OrderBookSnapshot {
            bids: parse_levels(&self.bids, depth)?,
            asks: parse_levels(&self.asks, depth)?,
        })
    }
}

fn parse_levels(levels: &[[String; 2]], depth: usize) -> Result<Vec<PriceLevel>, BinanceError> {
    levels
        .iter()
        .take(depth)
        .map(|[price, quantity]| {
            let price = parse_f64(price)?;
            let quantity = parse_f64(quantity)?;
            Ok(PriceLevel::new(price, quantity))
        })
        .collect()
}

fn parse_f64(s: &str) -> Result<f64, BinanceError> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| BinanceError::Parse(format!("not a number: {s:?}")))
}

/// Smallest accepted depth limit covering `depth` levels.
#[must_use]
pub fn depth_limit(depth: usize) -> usize {
    DEPTH_LIMITS
        .iter()
        .copied()
        .find(|&limit| limit >= depth)
        .unwrap_or(DEPTH_LIMITS[DEPTH_LIMITS.len() - 1])
}

/// Parses a single kline from the Binance API response.
///
/// Binance kline format:
/// ```text
/// [
///   1499040000000,      // 0: Open time
///   "0.01634000",       // 1: Open
///   "0.80000000",       // 2: High
///   "0.01575800",       // 3: Low
///   "0.01577100",       // 4: Close
///   "148976.11427815",  // 5: Volume
///   1499644799999,      // 6: Close time
///   ...
/// ]
/// ```
#[must_use]
pub fn parse_kline(kline: &[serde_json::Value]) -> Option<Candle> {
    if kline.len() < 6 {
        return None;
    }

    let open_time_ms = kline[0].as_i64()?;
    let open_time: DateTime<Utc> = Utc.timestamp_millis_opt(open_time_ms).single()?;

    Some(Candle {
        open_time,
        open: parse_f64_from_json(&kline[1])?,
        high: parse_f64_from_json(&kline[2])?,
        low: parse_f64_from_json(&kline[3])?,
        close: parse_f64_from_json(&kline[4])?,
        volume: parse_f64_from_json(&kline[5])?,
    })
}

/// Parses a number from a JSON value (handles both string and number formats).
fn parse_f64_from_json(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Parses a full klines response, failing on the first malformed entry.
///
/// # Errors
/// Returns [`BinanceError::Parse`] naming the offending index.
pub fn parse_klines(data: &[Vec<serde_json::Value>]) -> Result<Vec<Candle>, BinanceError> {
    data.iter()
        .enumerate()
        .map(|(i, kline)| {
            parse_kline(kline).ok_or_else(|| BinanceError::Parse(format!("malformed kline at index {i}")))
        })
        .collect()
}
