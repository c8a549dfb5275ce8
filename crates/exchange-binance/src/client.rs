//! Rate-limited client for the Binance spot REST API.
//!
//! Only the two public market-data endpoints the reports need are wrapped:
//! `/api/v3/klines` and `/api/v3/depth`. No authentication.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;

use market_report_core::{
    BinanceConfig, Candle, CandleSeries, CandleSource, EngineError, Interval, OrderBookSnapshot,
};

use crate::error::{BinanceError, INVALID_SYMBOL_CODE};
use crate::models::{depth_limit, parse_klines, ApiErrorBody, DepthResponse};

/// Maximum candles per klines request.
pub const MAX_KLINES_PER_REQUEST: usize = 1000;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Binance REST client implementing [`CandleSource`].
#[derive(Clone)]
pub struct BinanceClient {
    http: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<DirectLimiter>,
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BinanceClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    /// Returns [`BinanceError::Config`] if the rate limit is zero or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &BinanceConfig) -> Result<Self, BinanceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BinanceError::Config(format!("failed to build HTTP client: {e}")))?;

        let per_second = NonZeroU32::new(config.rate_limit_per_second)
            .ok_or_else(|| BinanceError::Config("rate limit must be > 0".to_string()))?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    /// See [`from_config`](Self::from_config).
    pub fn new() -> Result<Self, BinanceError> {
        Self::from_config(&BinanceConfig::default())
    }

    /// Overrides the base URL (for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        symbol: &str,
        query: &[(&str, String)],
    ) -> Result<T, BinanceError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, symbol, "binance request");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &body, symbol));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BinanceError::Parse(format!("{path}: {e}")))
    }

    /// Fetches the latest `limit` klines, oldest first.
    ///
    /// `limit` is clamped to `1..=1000`.
    ///
    /// # Errors
    /// Returns a [`BinanceError`] on transport, API or parse failure.
    pub async fn klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, BinanceError> {
        let limit = limit.clamp(1, MAX_KLINES_PER_REQUEST);
        let data: Vec<Vec<serde_json::Value>> = self
            .get(
                "/api/v3/klines",
                symbol,
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        parse_klines(&data)
    }

    /// Fetches an order book snapshot with at most `depth` levels per side.
    ///
    /// # Errors
    /// Returns a [`BinanceError`] on transport, API or parse failure.
    pub async fn depth(&self, symbol: &str, depth: usize) -> Result<OrderBookSnapshot, BinanceError> {
        let response: DepthResponse = self
            .get(
                "/api/v3/depth",
                symbol,
                &[
                    ("symbol", symbol.to_string()),
                    ("limit", depth_limit(depth).to_string()),
                ],
            )
            .await?;
        response.into_snapshot(depth)
    }
}

/// Maps a non-2xx response to an error, recognising unknown symbols.
fn classify_failure(status: u16, body: &str, symbol: &str) -> BinanceError {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
    match parsed {
        Some(err) if err.code == INVALID_SYMBOL_CODE => BinanceError::InvalidSymbol(symbol.to_string()),
        Some(err) => BinanceError::Api {
            status,
            code: Some(err.code),
            message: err.msg,
        },
        None => BinanceError::Api {
            status,
            code: None,
            message: body.to_string(),
        },
    }
}

#[async_trait]
impl CandleSource for BinanceClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        count: usize,
    ) -> Result<CandleSeries, EngineError> {
        let candles = self.klines(symbol, interval, count).await?;
        CandleSeries::new(interval, candles)
    }

    async fn fetch_order_book(
        &self,
        symbol: &str,
        depth: usize,
    ) -> Result<OrderBookSnapshot, EngineError> {
        Ok(self.depth(symbol, depth).await?)
    }

    fn name(&self) -> &str {
        "binance"
    }
}
