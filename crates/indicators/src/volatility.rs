//! True range, ATR and ADX. All smoothing is Wilder's (1/period).

use serde::{Deserialize, Serialize};

use market_report_core::{ensure_len, EngineError};

use crate::ensure_aligned;
use crate::moving_average::{check_period, wilder_series};

/// ADX with its directional indicators at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxOutput {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// True range from the second bar onwards.
///
/// `TR = max(high - low, |high - prev_close|, |low - prev_close|)`
///
/// # Errors
/// `ComputationError` on misaligned slices, `InsufficientData` with fewer
/// than two bars.
pub fn true_range_series(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
) -> Result<Vec<f64>, EngineError> {
    ensure_aligned("True range", highs, lows, closes)?;
    ensure_len("True range", closes, 2)?;

    Ok((1..closes.len())
        .map(|i| {
            let prev_close = closes[i - 1];
            (highs[i] - lows[i])
                .max((highs[i] - prev_close).abs())
                .max((lows[i] - prev_close).abs())
        })
        .collect())
}

/// Average True Range.
///
/// # Errors
/// `InsufficientData` when fewer than `period + 1` bars.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Result<f64, EngineError> {
    check_period("ATR", period)?;
    ensure_aligned("ATR", highs, lows, closes)?;
    ensure_len(&format!("ATR({period})"), closes, period + 1)?;

    let tr = true_range_series(highs, lows, closes)?;
    let smoothed = wilder_series(&tr, period)?;
    Ok(smoothed[smoothed.len() - 1])
}

/// Average Directional Index.
///
/// Directional movement and true range are Wilder-smoothed, DI lines are
/// `100 * DM / TR` (0 when TR is 0) and ADX is the Wilder average of DX.
///
/// # Errors
/// `InsufficientData` when fewer than `2 * period` bars.
pub fn adx(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Result<AdxOutput, EngineError> {
    check_period("ADX", period)?;
    ensure_aligned("ADX", highs, lows, closes)?;
    ensure_len(&format!("ADX({period})"), closes, 2 * period)?;

    let tr = true_range_series(highs, lows, closes)?;
    let (plus_dm, minus_dm): (Vec<f64>, Vec<f64>) = (1..closes.len())
        .map(|i| {
            let up = highs[i] - highs[i - 1];
            let down = lows[i - 1] - lows[i];
            let plus = if up > down && up > 0.0 { up } else { 0.0 };
            let minus = if down > up && down > 0.0 { down } else { 0.0 };
            (plus, minus)
        })
        .unzip();

    let smoothed_tr = wilder_series(&tr, period)?;
    let smoothed_plus = wilder_series(&plus_dm, period)?;
    let smoothed_minus = wilder_series(&minus_dm, period)?;

    let mut plus_di = Vec::with_capacity(smoothed_tr.len());
    let mut minus_di = Vec::with_capacity(smoothed_tr.len());
    let mut dx = Vec::with_capacity(smoothed_tr.len());

    for ((&tr, &plus), &minus) in smoothed_tr.iter().zip(&smoothed_plus).zip(&smoothed_minus) {
        let (p, m) = if tr == 0.0 {
            (0.0, 0.0)
        } else {
            (100.0 * plus / tr, 100.0 * minus / tr)
        };
        let sum = p + m;
        dx.push(if sum == 0.0 {
            0.0
        } else {
            100.0 * (p - m).abs() / sum
        });
        plus_di.push(p);
        minus_di.push(m);
    }

    let adx_series = wilder_series(&dx, period)?;
    Ok(AdxOutput {
        adx: adx_series[adx_series.len() - 1],
        plus_di: plus_di[plus_di.len() - 1],
        minus_di: minus_di[minus_di.len() - 1],
    })
}
