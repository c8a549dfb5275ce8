//! Error types for the Binance REST adapter.

use market_report_core::EngineError;
use thiserror::Error;

/// Binance error code for an unknown symbol.
pub const INVALID_SYMBOL_CODE: i64 = -1121;

/// Errors that can occur when talking to Binance.
#[derive(Debug, Error)]
pub enum BinanceError {
    /// Symbol rejected by the exchange.
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    /// API request failed.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Binance error code, when the body carried one.
        code: Option<i64>,
        /// Error message from API.
        message: String,
    },

    /// Network or timeout error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Parse(String),

    /// Client could not be built from configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<BinanceError> for EngineError {
    fn from(error: BinanceError) -> Self {
        match error {
            BinanceError::InvalidSymbol(symbol) => EngineError::InvalidSymbol(symbol),
            other => EngineError::upstream(format!("binance: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_report_core::ErrorKind;

    #[test]
    fn test_invalid_symbol_maps_to_invalid_symbol() {
        let err: EngineError = BinanceError::InvalidSymbol("FOO".to_string()).into();
        assert_eq!(err, EngineError::InvalidSymbol("FOO".to_string()));
    }

    #[test]
    fn test_other_errors_map_to_upstream() {
        let err: EngineError = BinanceError::Api {
            status: 503,
            code: None,
            message: "Service Unavailable".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(err.to_string().contains("503"));

        let err: EngineError = BinanceError::Parse("bad kline".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }
}
