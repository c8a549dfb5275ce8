//! Short-horizon trend slope, VWAP and volume momentum.

use serde::Serialize;

use market_report_core::{checked_div, ensure_len, CandleSeries, EngineError};
use market_report_indicators::{momentum, sma};

/// Least-squares fit of values against their index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, 0 for a constant series
    pub r_squared: f64,
}

/// Ordinary least squares of `values[i]` on `i`.
///
/// # Errors
/// `InsufficientData` with fewer than two points.
pub fn linear_regression(values: &[f64]) -> Result<LinearFit, EngineError> {
    ensure_len("linear regression", values, 2)?;

    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = values.iter().map(|y| (y - mean_y).powi(2)).sum();
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        let ss_res: f64 = values
            .iter()
            .enumerate()
            .map(|(i, y)| (y - (intercept + slope * i as f64)).powi(2))
            .sum();
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

/// Pearson correlation coefficient, 0 when either side has no variance.
#[must_use]
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator < f64::EPSILON {
        return 0.0;
    }

    (covariance / denominator).clamp(-1.0, 1.0)
}

/// Slope statistics for a fine-grained window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlopeAnalysis {
    pub candles: usize,
    /// Regression slope of close, price per candle
    pub slope_per_candle: f64,
    /// Regression slope of close, price per minute
    pub slope_per_minute: f64,
    /// Slope per candle as % of the mean close
    pub slope_pct: f64,
    pub r_squared: f64,
    pub momentum: f64,
    pub vwap: f64,
    /// Last close relative to VWAP, in percent
    pub vwap_deviation_pct: f64,
    /// Simple moving average of volume
    pub vma: f64,
    pub volume_momentum: f64,
    /// Correlation of price changes with volume changes, in [-1, 1]
    pub price_volume_strength: f64,
}

/// Slope analyzer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlopeAnalyzer {
    pub momentum_period: usize,
    pub vma_period: usize,
    pub volume_momentum_period: usize,
}

impl Default for SlopeAnalyzer {
    fn default() -> Self {
        Self {
            momentum_period: 10,
            vma_period: 20,
            volume_momentum_period: 10,
        }
    }
}

impl SlopeAnalyzer {
    /// Candles needed by the widest component.
    #[must_use]
    pub fn min_history(&self) -> usize {
        [
            2,
            self.momentum_period + 1,
            self.vma_period,
            self.volume_momentum_period + 1,
        ]
        .into_iter()
        .max()
        .unwrap_or(2)
    }

    /// # Errors
    /// `InsufficientData` when the series is shorter than
    /// [`min_history`](Self::min_history); `ComputationError` when total
    /// volume, VWAP or mean close is zero.
    pub fn analyze(&self, series: &CandleSeries) -> Result<SlopeAnalysis, EngineError> {
        ensure_len("slope analysis", series.candles(), self.min_history())?;

        let closes = series.closes();
        let volumes = series.volumes();

        let fit = linear_regression(&closes)?;
        let mean_close = closes.iter().sum::<f64>() / closes.len() as f64;
        let slope_pct = checked_div("slope %", fit.slope, mean_close)? * 100.0;
        let minutes = f64::from(series.interval().minutes());

        let total_volume: f64 = volumes.iter().sum();
        let weighted: f64 = series
            .candles()
            .iter()
            .map(|c| c.typical_price() * c.volume)
            .sum();
        let vwap = checked_div("VWAP", weighted, total_volume)?;
        let last_close = closes[closes.len() - 1];
        let vwap_deviation_pct = checked_div("VWAP deviation", last_close - vwap, vwap)? * 100.0;

        let price_changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
        let volume_changes: Vec<f64> = volumes.windows(2).map(|w| w[1] - w[0]).collect();

        let analysis = SlopeAnalysis {
            candles: closes.len(),
            slope_per_candle: fit.slope,
            slope_per_minute: fit.slope / minutes,
            slope_pct,
            r_squared: fit.r_squared,
            momentum: momentum(&closes, self.momentum_period)?,
            vwap,
            vwap_deviation_pct,
            vma: sma(&volumes, self.vma_period)?,
            volume_momentum: momentum(&volumes, self.volume_momentum_period)?,
            price_volume_strength: pearson_correlation(&price_changes, &volume_changes),
        };

        tracing::debug!(
            slope = analysis.slope_per_candle,
            r_squared = analysis.r_squared,
            vwap,
            "analyzed slope"
        );

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use market_report_core::{Candle, ErrorKind, Interval};

    fn series(interval: Interval, closes: &[f64], volumes: &[f64]) -> CandleSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| Candle {
                open_time: start + Duration::minutes(i as i64 * i64::from(interval.minutes())),
                open: close,
                high: close,
                low: close,
                close,
                volume,
            })
            .collect();
        CandleSeries::new(interval, candles).unwrap()
    }

    #[test]
    fn ramp_has_unit_slope_and_momentum() {
        let closes: Vec<f64> = (1..=20).map(f64::from).collect();
        let s = series(Interval::OneMinute, &closes, &[5.0; 20]);
        let a = SlopeAnalyzer::default().analyze(&s).unwrap();
        assert!((a.slope_per_candle - 1.0).abs() < 1e-12);
        assert!((a.slope_per_minute - 1.0).abs() < 1e-12);
        assert!((a.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(a.momentum, 10.0);
        assert_eq!(a.volume_momentum, 0.0);
        assert_eq!(a.vma, 5.0);
        assert_eq!(a.price_volume_strength, 0.0);
    }

    #[test]
    fn slope_per_minute_scales_with_interval() {
        let closes: Vec<f64> = (1..=20).map(|i| f64::from(i) * 15.0).collect();
        let s = series(Interval::FifteenMinutes, &closes, &[5.0; 20]);
        let a = SlopeAnalyzer::default().analyze(&s).unwrap();
        assert!((a.slope_per_candle - 15.0).abs() < 1e-9);
        assert!((a.slope_per_minute - 1.0).abs() < 1e-9);
    }

    #[test]
    fn vwap_weights_by_volume() {
        let mut closes = vec![100.0; 20];
        closes[19] = 200.0;
        let mut volumes = vec![0.0; 20];
        volumes[0] = 1.0;
        volumes[19] = 3.0;
        let s = series(Interval::OneMinute, &closes, &volumes);
        let a = SlopeAnalyzer::default().analyze(&s).unwrap();
        assert!((a.vwap - 175.0).abs() < 1e-9);
        assert!((a.vwap_deviation_pct - (200.0 - 175.0) / 175.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_volume_is_computation_error() {
        let closes: Vec<f64> = (1..=20).map(f64::from).collect();
        let s = series(Interval::OneMinute, &closes, &[0.0; 20]);
        let err = SlopeAnalyzer::default().analyze(&s).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ComputationError);
    }

    #[test]
    fn short_window_is_insufficient() {
        let s = series(Interval::OneMinute, &[1.0; 19], &[1.0; 19]);
        let err = SlopeAnalyzer::default().analyze(&s).unwrap_err();
        assert_eq!(err, EngineError::insufficient("slope analysis", 20, 19));
    }

    #[test]
    fn volume_rising_with_price_is_positive_strength() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + f64::from(i * i) * 0.1).collect();
        let volumes: Vec<f64> = (0..30).map(|i| 10.0 + f64::from(i * i)).collect();
        let s = series(Interval::OneMinute, &closes, &volumes);
        let a = SlopeAnalyzer::default().analyze(&s).unwrap();
        assert!(a.price_volume_strength > 0.99);
    }

    #[test]
    fn pearson_bounds_and_degenerate_cases() {
        assert!((pearson_correlation(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-12);
        assert!((pearson_correlation(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
        assert_eq!(pearson_correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(pearson_correlation(&[1.0], &[1.0]), 0.0);
    }

    #[test]
    fn constant_series_has_zero_r_squared() {
        let fit = linear_regression(&[3.0; 10]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 0.0);
    }
}
