//! Moving averages: SMA, EMA, DEMA, WMA and Wilder's running average.
//!
//! Series functions return one value per fully-formed window, oldest first,
//! so `series.len() == values.len() - min_history + 1`.

use market_report_core::{ensure_len, EngineError};

/// Rejects a zero period before any window arithmetic.
pub(crate) fn check_period(context: &str, period: usize) -> Result<(), EngineError> {
    if period == 0 {
        return Err(EngineError::computation(format!(
            "{context}: period must be >= 1"
        )));
    }
    Ok(())
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Simple moving average of the last `period` values.
///
/// # Errors
/// `InsufficientData` when `values.len() < period`.
pub fn sma(values: &[f64], period: usize) -> Result<f64, EngineError> {
    check_period("SMA", period)?;
    ensure_len(&format!("SMA({period})"), values, period)?;
    Ok(mean(&values[values.len() - period..]))
}

/// SMA for every complete window.
///
/// # Errors
/// `InsufficientData` when `values.len() < period`.
pub fn sma_series(values: &[f64], period: usize) -> Result<Vec<f64>, EngineError> {
    check_period("SMA", period)?;
    ensure_len(&format!("SMA({period})"), values, period)?;
    Ok(values.windows(period).map(mean).collect())
}

/// Exponential moving average series.
///
/// Multiplier `k = 2 / (period + 1)`. First value seeded with SMA of the
/// first `period` values.
///
/// # Errors
/// `InsufficientData` when `values.len() < period`.
pub fn ema_series(values: &[f64], period: usize) -> Result<Vec<f64>, EngineError> {
    check_period("EMA", period)?;
    ensure_len(&format!("EMA({period})"), values, period)?;

    let k = 2.0 / (period as f64 + 1.0);
    let mut current = mean(&values[..period]);

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(current);
    for &value in &values[period..] {
        current = value * k + current * (1.0 - k);
        result.push(current);
    }
    Ok(result)
}

/// Latest EMA value.
///
/// # Errors
/// `InsufficientData` when `values.len() < period`.
pub fn ema(values: &[f64], period: usize) -> Result<f64, EngineError> {
    let series = ema_series(values, period)?;
    Ok(series[series.len() - 1])
}

/// Double EMA: `2 * EMA - EMA(EMA)`.
///
/// # Errors
/// `InsufficientData` when `values.len() < 2 * period - 1`.
pub fn dema(values: &[f64], period: usize) -> Result<f64, EngineError> {
    check_period("DEMA", period)?;
    ensure_len(&format!("DEMA({period})"), values, 2 * period - 1)?;

    let first = ema_series(values, period)?;
    let second = ema_series(&first, period)?;
    Ok(2.0 * first[first.len() - 1] - second[second.len() - 1])
}

/// Linearly weighted moving average, newest value weighted `period`.
///
/// # Errors
/// `InsufficientData` when `values.len() < period`.
pub fn wma(values: &[f64], period: usize) -> Result<f64, EngineError> {
    check_period("WMA", period)?;
    ensure_len(&format!("WMA({period})"), values, period)?;

    let window = &values[values.len() - period..];
    let weighted: f64 = window
        .iter()
        .enumerate()
        .map(|(i, v)| v * (i + 1) as f64)
        .sum();
    let denominator = (period * (period + 1)) as f64 / 2.0;
    Ok(weighted / denominator)
}

/// Wilder's running average (RMA), smoothing constant `1 / period`.
///
/// Seeded with the mean of the first `period` values, then
/// `avg = (avg * (period - 1) + x) / period`.
///
/// # Errors
/// `InsufficientData` when `values.len() < period`.
pub fn wilder_series(values: &[f64], period: usize) -> Result<Vec<f64>, EngineError> {
    check_period("Wilder average", period)?;
    ensure_len(&format!("Wilder average({period})"), values, period)?;

    let p = period as f64;
    let mut current = mean(&values[..period]);

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(current);
    for &value in &values[period..] {
        current = (current * (p - 1.0) + value) / p;
        result.push(current);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_report_core::ErrorKind;

    const EPS: f64 = 1e-9;

    #[test]
    fn sma_of_last_window() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((sma(&v, 3).unwrap() - 4.0).abs() < EPS);
        assert!((sma(&v, 5).unwrap() - 3.0).abs() < EPS);
    }

    #[test]
    fn sma_series_has_one_value_per_window() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        let s = sma_series(&v, 2).unwrap();
        assert_eq!(s, vec![1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn sma_short_input_is_insufficient() {
        let err = sma(&[1.0, 2.0], 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn zero_period_is_computation_error() {
        assert_eq!(
            sma(&[1.0], 0).unwrap_err().kind(),
            ErrorKind::ComputationError
        );
        assert_eq!(
            ema(&[1.0], 0).unwrap_err().kind(),
            ErrorKind::ComputationError
        );
    }

    #[test]
    fn ema_seeded_with_sma() {
        // seed = (1+2+3)/3 = 2; k = 0.5; next = 4*0.5 + 2*0.5 = 3
        let s = ema_series(&[1.0, 2.0, 3.0, 4.0], 3).unwrap();
        assert_eq!(s.len(), 2);
        assert!((s[0] - 2.0).abs() < EPS);
        assert!((s[1] - 3.0).abs() < EPS);
    }

    #[test]
    fn ema_tracks_linear_series_with_lag() {
        let v: Vec<f64> = (1..=50).map(f64::from).collect();
        let e = ema(&v, 10).unwrap();
        // Steady-state lag of EMA on a unit ramp is (period - 1) / 2
        assert!((e - (50.0 - 4.5)).abs() < 0.01, "ema was {e}");
    }

    #[test]
    fn dema_removes_ramp_lag() {
        let v: Vec<f64> = (1..=80).map(f64::from).collect();
        let d = dema(&v, 10).unwrap();
        let e = ema(&v, 10).unwrap();
        assert!((d - 80.0).abs() < (e - 80.0).abs());
    }

    #[test]
    fn dema_requires_two_periods_minus_one() {
        let v: Vec<f64> = (1..=18).map(f64::from).collect();
        let err = dema(&v, 10).unwrap_err();
        assert_eq!(
            err,
            EngineError::insufficient("DEMA(10)", 19, 18)
        );
        let v: Vec<f64> = (1..=19).map(f64::from).collect();
        assert!(dema(&v, 10).is_ok());
    }

    #[test]
    fn wma_weights_newest_heaviest() {
        // (1*1 + 2*2 + 3*3) / 6 = 14 / 6
        let w = wma(&[1.0, 2.0, 3.0], 3).unwrap();
        assert!((w - 14.0 / 6.0).abs() < EPS);
    }

    #[test]
    fn wilder_uses_one_over_period() {
        // seed = 1.0 ; next = (1 * 1 + 4) / 2 = 2.5
        let s = wilder_series(&[0.0, 2.0, 4.0], 2).unwrap();
        assert!((s[0] - 1.0).abs() < EPS);
        assert!((s[1] - 2.5).abs() < EPS);
    }
}
