//! Binance public REST API as a candle source.
//!
//! # Example
//!
//! ```no_run
//! use market_report_binance::BinanceClient;
//! use market_report_core::{CandleSource, Interval};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BinanceClient::new()?;
//! let series = client
//!     .fetch_candles("BTCUSDT", Interval::FifteenMinutes, 96)
//!     .await?;
//! println!("{} candles", series.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;

pub use client::{BinanceClient, MAX_KLINES_PER_REQUEST};
pub use error::{BinanceError, INVALID_SYMBOL_CODE};
pub use models::{depth_limit, parse_kline, parse_klines, DepthResponse, DEPTH_LIMITS};
