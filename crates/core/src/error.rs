//! Error types for report generation.
//!
//! Every failure a report request can hit maps to one of four kinds. The
//! engine never retries and never emits partial text; callers receive the
//! error with its kind and a human-readable cause.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of an [`EngineError`], stable for payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Fewer candles or levels than a computation requires.
    InsufficientData,
    /// The symbol is unknown to the candle source.
    InvalidSymbol,
    /// Transport or upstream failure in the candle source.
    UpstreamUnavailable,
    /// A numeric guard tripped (division by zero, non-finite value).
    ComputationError,
}

impl ErrorKind {
    /// Returns the snake_case name used in payloads and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient_data",
            Self::InvalidSymbol => "invalid_symbol",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::ComputationError => "computation_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while fetching data or computing a report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Input shorter than the minimum history of a computation.
    #[error("insufficient data for {context}: required {required}, available {available}")]
    InsufficientData {
        /// What was being computed.
        context: String,
        /// Minimum number of points needed.
        required: usize,
        /// Number of points supplied.
        available: usize,
    },

    /// Symbol rejected by the candle source.
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Candle source could not be reached or answered with garbage.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Guarded numeric failure.
    #[error("computation error: {0}")]
    ComputationError(String),
}

impl EngineError {
    /// Creates an insufficient data error.
    pub fn insufficient(context: impl Into<String>, required: usize, available: usize) -> Self {
        Self::InsufficientData {
            context: context.into(),
            required,
            available,
        }
    }

    /// Creates an upstream error.
    pub fn upstream(cause: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(cause.into())
    }

    /// Creates a computation error.
    pub fn computation(cause: impl Into<String>) -> Self {
        Self::ComputationError(cause.into())
    }

    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::InvalidSymbol(_) => ErrorKind::InvalidSymbol,
            Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::ComputationError(_) => ErrorKind::ComputationError,
        }
    }
}

/// Checks that `input` holds at least `required` points.
///
/// # Errors
/// Returns [`EngineError::InsufficientData`] when the slice is too short.
pub fn ensure_len<T>(context: &str, input: &[T], required: usize) -> Result<(), EngineError> {
    if input.len() < required {
        return Err(EngineError::insufficient(context, required, input.len()));
    }
    Ok(())
}

/// Rejects NaN and infinities before they can reach report text.
///
/// # Errors
/// Returns [`EngineError::ComputationError`] when `value` is not finite.
pub fn ensure_finite(context: &str, value: f64) -> Result<f64, EngineError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::computation(format!(
            "{context} produced a non-finite value"
        )))
    }
}

/// Divides, failing on a zero or non-finite denominator.
///
/// # Errors
/// Returns [`EngineError::ComputationError`] when the quotient is undefined.
pub fn checked_div(context: &str, numerator: f64, denominator: f64) -> Result<f64, EngineError> {
    if denominator == 0.0 {
        return Err(EngineError::computation(format!(
            "{context}: division by zero"
        )));
    }
    ensure_finite(context, numerator / denominator)
}
