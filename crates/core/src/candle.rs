//! OHLCV candles and candle series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;

/// Candle granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "3m")]
    ThreeMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
}

impl Interval {
    /// Returns the exchange string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::ThreeMinutes => "3m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::TwoHours => "2h",
            Interval::FourHours => "4h",
            Interval::SixHours => "6h",
            Interval::TwelveHours => "12h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1w",
        }
    }

    /// Returns the interval duration in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u32 {
        match self {
            Interval::OneMinute => 1,
            Interval::ThreeMinutes => 3,
            Interval::FiveMinutes => 5,
            Interval::FifteenMinutes => 15,
            Interval::ThirtyMinutes => 30,
            Interval::OneHour => 60,
            Interval::TwoHours => 120,
            Interval::FourHours => 240,
            Interval::SixHours => 360,
            Interval::TwelveHours => 720,
            Interval::OneDay => 1_440,
            Interval::OneWeek => 10_080,
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "1m" => Ok(Interval::OneMinute),
            "3m" => Ok(Interval::ThreeMinutes),
            "5m" => Ok(Interval::FiveMinutes),
            "15m" => Ok(Interval::FifteenMinutes),
            "30m" => Ok(Interval::ThirtyMinutes),
            "1h" => Ok(Interval::OneHour),
            "2h" => Ok(Interval::TwoHours),
            "4h" => Ok(Interval::FourHours),
            "6h" => Ok(Interval::SixHours),
            "12h" => Ok(Interval::TwelveHours),
            "1d" => Ok(Interval::OneDay),
            "1w" => Ok(Interval::OneWeek),
            _ => anyhow::bail!("Invalid interval: {s}. Expected one of 1m, 3m, 5m, 15m, 30m, 1h, 2h, 4h, 6h, 12h, 1d, 1w"),
        }
    }
}

/// One OHLCV bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Typical price `(high + low + close) / 3`.
    #[must_use]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// High minus low.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Candles of one interval, strictly ascending by open time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleSeries {
    interval: Interval,
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Creates a series, rejecting out-of-order or duplicate open times.
    ///
    /// # Errors
    /// Returns [`EngineError::UpstreamUnavailable`] when open times are not
    /// strictly increasing; ordering is the candle source's contract.
    pub fn new(interval: Interval, candles: Vec<Candle>) -> Result<Self, EngineError> {
        if let Some(pair) = candles
            .windows(2)
            .find(|pair| pair[1].open_time <= pair[0].open_time)
        {
            return Err(EngineError::upstream(format!(
                "candle open times not strictly increasing at {}",
                pair[1].open_time.to_rfc3339()
            )));
        }
        Ok(Self { interval, candles })
    }

    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    #[must_use]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Newest candle.
    #[must_use]
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// The last `n` candles (all of them if fewer).
    #[must_use]
    pub fn tail(&self, n: usize) -> &[Candle] {
        &self.candles[self.candles.len().saturating_sub(n)..]
    }

    #[must_use]
    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    #[must_use]
    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    #[must_use]
    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn candle_at(minute: i64, close: f64) -> Candle {
        Candle {
            open_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minute),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn test_interval_as_str() {
        assert_eq!(Interval::OneMinute.as_str(), "1m");
        assert_eq!(Interval::FifteenMinutes.as_str(), "15m");
        assert_eq!(Interval::FourHours.as_str(), "4h");
        assert_eq!(Interval::OneDay.as_str(), "1d");
    }

    #[test]
    fn test_interval_minutes() {
        assert_eq!(Interval::OneMinute.minutes(), 1);
        assert_eq!(Interval::OneHour.minutes(), 60);
        assert_eq!(Interval::OneDay.minutes(), 1_440);
    }

    #[test]
    fn test_interval_from_str_case_insensitive() {
        assert_eq!("1H".parse::<Interval>().unwrap(), Interval::OneHour);
        assert_eq!("30m".parse::<Interval>().unwrap(), Interval::ThirtyMinutes);
        assert!("7m".parse::<Interval>().is_err());
    }

    #[test]
    fn test_interval_serde_uses_exchange_names() {
        let json = serde_json::to_string(&Interval::FourHours).unwrap();
        assert_eq!(json, "\"4h\"");
        let back: Interval = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(back, Interval::FifteenMinutes);
    }

    #[test]
    fn series_accepts_ascending_times() {
        let series = CandleSeries::new(
            Interval::OneMinute,
            vec![candle_at(0, 1.0), candle_at(1, 2.0), candle_at(2, 3.0)],
        )
        .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.tail(2).len(), 2);
        assert_eq!(series.tail(10).len(), 3);
    }

    #[test]
    fn series_rejects_duplicate_times() {
        let err = CandleSeries::new(
            Interval::OneMinute,
            vec![candle_at(0, 1.0), candle_at(0, 2.0)],
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UpstreamUnavailable);
    }

    #[test]
    fn typical_price_is_hlc_mean() {
        let c = candle_at(0, 100.0);
        assert!((c.typical_price() - 100.0).abs() < 1e-12);
        assert!((c.range() - 2.0).abs() < 1e-12);
    }
}
