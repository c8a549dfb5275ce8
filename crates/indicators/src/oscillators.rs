//! Bounded oscillators and rate-of-change indicators.

use serde::{Deserialize, Serialize};

use market_report_core::{ensure_len, EngineError};

use crate::ensure_aligned;
use crate::moving_average::{check_period, mean, sma, sma_series, wilder_series};

/// %K / %D pair shared by the stochastic family, both scaled 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticOutput {
    pub k: f64,
    pub d: f64,
}

/// RSI for every bar once `period` changes are available.
///
/// Average gain and loss are Wilder-smoothed. A window with neither gains
/// nor losses reads 50; one with gains only reads 100.
///
/// # Errors
/// `InsufficientData` when `closes.len() < period + 1`.
pub fn rsi_series(closes: &[f64], period: usize) -> Result<Vec<f64>, EngineError> {
    check_period("RSI", period)?;
    ensure_len(&format!("RSI({period})"), closes, period + 1)?;

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let avg_gain = wilder_series(&gains, period)?;
    let avg_loss = wilder_series(&losses, period)?;

    Ok(avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&gain, &loss)| rsi_from_averages(gain, loss))
        .collect())
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

/// Latest RSI value.
///
/// # Errors
/// `InsufficientData` when `closes.len() < period + 1`.
pub fn rsi(closes: &[f64], period: usize) -> Result<f64, EngineError> {
    let series = rsi_series(closes, period)?;
    Ok(series[series.len() - 1])
}

/// Position of `value` inside `[low, high]` as a percentage, 50 when flat.
fn percent_of_range(value: f64, low: f64, high: f64) -> f64 {
    let range = high - low;
    if range == 0.0 {
        50.0
    } else {
        (value - low) / range * 100.0
    }
}

fn window_bounds(window: &[f64]) -> (f64, f64) {
    window
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Stochastic RSI.
///
/// Raw value is the position of RSI within its `stoch_period` range, %K is
/// the SMA(`k_smooth`) of the raw series and %D the SMA(`d_smooth`) of %K.
///
/// # Errors
/// `InsufficientData` when
/// `closes.len() < rsi_period + stoch_period + k_smooth + d_smooth - 2`.
pub fn stoch_rsi(
    closes: &[f64],
    rsi_period: usize,
    stoch_period: usize,
    k_smooth: usize,
    d_smooth: usize,
) -> Result<StochasticOutput, EngineError> {
    for period in [rsi_period, stoch_period, k_smooth, d_smooth] {
        check_period("StochRSI", period)?;
    }
    let required = rsi_period + stoch_period + k_smooth + d_smooth - 2;
    ensure_len(
        &format!("StochRSI({rsi_period},{stoch_period},{k_smooth},{d_smooth})"),
        closes,
        required,
    )?;

    let rsi_values = rsi_series(closes, rsi_period)?;
    let raw: Vec<f64> = rsi_values
        .windows(stoch_period)
        .map(|window| {
            let (low, high) = window_bounds(window);
            percent_of_range(window[window.len() - 1], low, high)
        })
        .collect();

    let k_series = sma_series(&raw, k_smooth)?;
    let d = sma(&k_series, d_smooth)?;
    Ok(StochasticOutput {
        k: k_series[k_series.len() - 1],
        d,
    })
}

/// Fast stochastic oscillator over high/low/close: %K is the raw last
/// reading and %D its simple moving average.
///
/// # Errors
/// `InsufficientData` when fewer than `k_period + d_period - 1` bars, and
/// `ComputationError` when the slices differ in length.
pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> Result<StochasticOutput, EngineError> {
    check_period("Stochastic", k_period)?;
    check_period("Stochastic", d_period)?;
    ensure_aligned("Stochastic", highs, lows, closes)?;
    ensure_len(
        &format!("Stochastic({k_period},{d_period})"),
        closes,
        k_period + d_period - 1,
    )?;

    let raw_k: Vec<f64> = (k_period - 1..closes.len())
        .map(|end| {
            let start = end + 1 - k_period;
            let (_, highest) = window_bounds(&highs[start..=end]);
            let (lowest, _) = window_bounds(&lows[start..=end]);
            percent_of_range(closes[end], lowest, highest)
        })
        .collect();

    let d = sma(&raw_k, d_period)?;
    Ok(StochasticOutput {
        k: raw_k[raw_k.len() - 1],
        d,
    })
}

/// Commodity Channel Index over typical price.
///
/// Reads 0 when the mean absolute deviation is zero.
///
/// # Errors
/// `InsufficientData` when fewer than `period` bars.
pub fn cci(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Result<f64, EngineError> {
    check_period("CCI", period)?;
    ensure_aligned("CCI", highs, lows, closes)?;
    ensure_len(&format!("CCI({period})"), closes, period)?;

    let start = closes.len() - period;
    let typical: Vec<f64> = (start..closes.len())
        .map(|i| (highs[i] + lows[i] + closes[i]) / 3.0)
        .collect();

    let average = mean(&typical);
    let mad = typical.iter().map(|tp| (tp - average).abs()).sum::<f64>() / period as f64;
    if mad == 0.0 {
        return Ok(0.0);
    }
    Ok((typical[typical.len() - 1] - average) / (0.015 * mad))
}

/// Price change over `period` bars.
///
/// # Errors
/// `InsufficientData` when `values.len() < period + 1`.
pub fn momentum(values: &[f64], period: usize) -> Result<f64, EngineError> {
    check_period("Momentum", period)?;
    ensure_len(&format!("Momentum({period})"), values, period + 1)?;
    let last = values.len() - 1;
    Ok(values[last] - values[last - period])
}

/// Rate of change over `period` bars, in percent.
///
/// # Errors
/// `InsufficientData` when `closes.len() < period + 1`; `ComputationError`
/// when the base close is zero.
pub fn roc(closes: &[f64], period: usize) -> Result<f64, EngineError> {
    check_period("ROC", period)?;
    ensure_len(&format!("ROC({period})"), closes, period + 1)?;
    let last = closes.len() - 1;
    let base = closes[last - period];
    if base == 0.0 {
        return Err(EngineError::computation(format!(
            "ROC({period}): base close is zero"
        )));
    }
    Ok((closes[last] - base) / base * 100.0)
}
