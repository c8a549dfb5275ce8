//! MACD and Bollinger Bands.

use serde::{Deserialize, Serialize};

use market_report_core::{ensure_len, EngineError};

use crate::moving_average::{check_period, ema_series, mean};

/// MACD line, signal line and histogram at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Bollinger Bands at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBands {
    /// Band width as a percentage of the middle band, 0 when the middle is 0.
    #[must_use]
    pub fn width_pct(&self) -> f64 {
        if self.middle == 0.0 {
            0.0
        } else {
            (self.upper - self.lower) / self.middle * 100.0
        }
    }

    /// Position of `price` between the bands (%B), 0.5 when the bands touch.
    #[must_use]
    pub fn percent_b(&self, price: f64) -> f64 {
        let width = self.upper - self.lower;
        if width == 0.0 {
            0.5
        } else {
            (price - self.lower) / width
        }
    }
}

/// Moving Average Convergence Divergence.
///
/// # Arguments
/// * `closes` - Close prices, oldest first
/// * `fast` / `slow` - EMA periods for the MACD line, `fast < slow`
/// * `signal` - EMA period applied to the MACD line
///
/// # Errors
/// `ComputationError` when `fast >= slow`, `InsufficientData` when
/// `closes.len() < slow + signal - 1`.
pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdOutput, EngineError> {
    for period in [fast, slow, signal] {
        check_period("MACD", period)?;
    }
    if fast >= slow {
        return Err(EngineError::computation(format!(
            "MACD: fast period {fast} must be shorter than slow period {slow}"
        )));
    }
    ensure_len(
        &format!("MACD({fast},{slow},{signal})"),
        closes,
        slow + signal - 1,
    )?;

    let fast_ema = ema_series(closes, fast)?;
    let slow_ema = ema_series(closes, slow)?;

    // fast_ema starts (slow - fast) bars before slow_ema
    let line: Vec<f64> = fast_ema[slow - fast..]
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();

    let signal_series = ema_series(&line, signal)?;
    let macd_value = line[line.len() - 1];
    let signal_value = signal_series[signal_series.len() - 1];

    Ok(MacdOutput {
        macd: macd_value,
        signal: signal_value,
        histogram: macd_value - signal_value,
    })
}

/// Bollinger Bands: SMA(`period`) plus/minus `k` population standard deviations.
///
/// # Errors
/// `InsufficientData` when `closes.len() < period`.
pub fn bollinger(closes: &[f64], period: usize, k: f64) -> Result<BollingerBands, EngineError> {
    check_period("Bollinger", period)?;
    ensure_len(&format!("Bollinger({period})"), closes, period)?;

    let window = &closes[closes.len() - period..];
    let middle = mean(window);
    let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / period as f64;
    let deviation = variance.sqrt();

    Ok(BollingerBands {
        upper: middle + k * deviation,
        middle,
        lower: middle - k * deviation,
    })
}
