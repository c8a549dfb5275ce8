//! Per-candle classification: volatility, body and wick proportions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use market_report_core::{ensure_len, Candle, EngineError, Thresholds};

/// Shape of a single candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandleKind {
    /// Close above open
    Bullish,
    /// Close below open
    Bearish,
    /// Body smaller than the doji threshold
    Doji,
}

impl CandleKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bullish => "Bullish",
            Self::Bearish => "Bearish",
            Self::Doji => "Doji",
        }
    }
}

/// Classification of one candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandleStats {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// (high - low) / close * 100
    pub volatility_pct: f64,
    /// |close - open| as % of the range
    pub body_pct: f64,
    pub upper_wick_pct: f64,
    pub lower_wick_pct: f64,
    pub kind: CandleKind,
    /// Volatility strictly above multiplier x window mean
    pub high_volatility: bool,
}

/// Counts over a classified window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandleSummary {
    pub bullish: usize,
    pub bearish: usize,
    pub doji: usize,
    pub mean_volatility_pct: f64,
    pub high_volatility: usize,
}

/// Classified window with its summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleAnalysis {
    pub candles: Vec<CandleStats>,
    pub summary: CandleSummary,
}

/// Classifies candles against doji and volatility thresholds.
#[derive(Debug, Clone, Copy)]
pub struct CandleClassifier {
    doji_body_pct: f64,
    high_volatility_multiplier: f64,
}

impl Default for CandleClassifier {
    fn default() -> Self {
        Self::from_thresholds(&Thresholds::default())
    }
}

impl CandleClassifier {
    #[must_use]
    pub fn from_thresholds(thresholds: &Thresholds) -> Self {
        Self {
            doji_body_pct: thresholds.doji_body_pct,
            high_volatility_multiplier: thresholds.high_volatility_multiplier,
        }
    }

    /// Classifies every candle, flagging high volatility relative to the
    /// mean of `candles`.
    ///
    /// # Errors
    /// `InsufficientData` for an empty window, `ComputationError` when a
    /// candle closes at zero.
    pub fn classify(&self, candles: &[Candle]) -> Result<CandleAnalysis, EngineError> {
        ensure_len("candle classification", candles, 1)?;

        let mut stats = candles
            .iter()
            .map(|c| self.classify_one(c))
            .collect::<Result<Vec<_>, _>>()?;

        let mean_volatility_pct =
            stats.iter().map(|s| s.volatility_pct).sum::<f64>() / stats.len() as f64;
        let cutoff = self.high_volatility_multiplier * mean_volatility_pct;

        let mut summary = CandleSummary {
            bullish: 0,
            bearish: 0,
            doji: 0,
            mean_volatility_pct,
            high_volatility: 0,
        };

        for s in &mut stats {
            s.high_volatility = s.volatility_pct > cutoff;
            if s.high_volatility {
                summary.high_volatility += 1;
            }
            match s.kind {
                CandleKind::Bullish => summary.bullish += 1,
                CandleKind::Bearish => summary.bearish += 1,
                CandleKind::Doji => summary.doji += 1,
            }
        }

        tracing::debug!(
            candles = stats.len(),
            mean_volatility_pct,
            high_volatility = summary.high_volatility,
            "classified candles"
        );

        Ok(CandleAnalysis {
            candles: stats,
            summary,
        })
    }

    /// Classifies a single candle. `high_volatility` is left `false`; it is
    /// only meaningful relative to a window.
    ///
    /// # Errors
    /// `ComputationError` when the close is zero.
    pub fn classify_one(&self, candle: &Candle) -> Result<CandleStats, EngineError> {
        if candle.close == 0.0 {
            return Err(EngineError::computation(format!(
                "candle at {} closes at zero",
                candle.open_time
            )));
        }

        let range = candle.range();
        let volatility_pct = range / candle.close * 100.0;

        let (body_pct, upper_wick_pct, lower_wick_pct) = if range == 0.0 {
            (0.0, 0.0, 0.0)
        } else {
            let body_top = candle.open.max(candle.close);
            let body_bottom = candle.open.min(candle.close);
            (
                (candle.close - candle.open).abs() / range * 100.0,
                (candle.high - body_top) / range * 100.0,
                (body_bottom - candle.low) / range * 100.0,
            )
        };

        let kind = if body_pct < self.doji_body_pct || candle.close == candle.open {
            CandleKind::Doji
        } else if candle.close > candle.open {
            CandleKind::Bullish
        } else {
            CandleKind::Bearish
        };

        Ok(CandleStats {
            open_time: candle.open_time,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
            volatility_pct,
            body_pct,
            upper_wick_pct,
            lower_wick_pct,
            kind,
            high_volatility: false,
        })
    }
}
