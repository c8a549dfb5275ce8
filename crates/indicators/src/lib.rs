//! Technical indicator library.
//!
//! Every function is pure over price/volume slices ordered oldest first.
//! Inputs shorter than an indicator's minimum history fail with
//! [`EngineError::InsufficientData`] instead of yielding a partial value.

pub mod moving_average;
pub mod oscillators;
pub mod spec;
pub mod trend;
pub mod volatility;

use market_report_core::EngineError;

pub use moving_average::{dema, ema, ema_series, sma, sma_series, wilder_series, wma};
pub use oscillators::{cci, momentum, roc, rsi, rsi_series, stoch_rsi, stochastic, StochasticOutput};
pub use spec::{IndicatorResult, IndicatorSpec};
pub use trend::{bollinger, macd, BollingerBands, MacdOutput};
pub use volatility::{adx, atr, true_range_series, AdxOutput};

/// High, low and close slices must describe the same bars.
pub(crate) fn ensure_aligned(
    context: &str,
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
) -> Result<(), EngineError> {
    if highs.len() != lows.len() || lows.len() != closes.len() {
        return Err(EngineError::computation(format!(
            "{context}: misaligned inputs (highs {}, lows {}, closes {})",
            highs.len(),
            lows.len(),
            closes.len()
        )));
    }
    Ok(())
}
