//! Declarative indicator descriptions used by report profiles.

use serde::Serialize;

use market_report_core::{CandleSeries, EngineError};

use crate::moving_average::{dema, ema, sma, wma};
use crate::oscillators::{cci, momentum, roc, rsi, stoch_rsi, stochastic, StochasticOutput};
use crate::trend::{bollinger, macd, BollingerBands, MacdOutput};
use crate::volatility::{adx, atr, AdxOutput};

/// One indicator with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorSpec {
    Sma(usize),
    Ema(usize),
    Dema(usize),
    Wma(usize),
    Rsi(usize),
    StochRsi {
        rsi: usize,
        stoch: usize,
        k: usize,
        d: usize,
    },
    Stochastic {
        k: usize,
        d: usize,
    },
    Cci(usize),
    Momentum(usize),
    Roc(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        k: f64,
    },
    Atr(usize),
    Adx(usize),
}

impl IndicatorSpec {
    /// Standard StochRSI(14, 14, 3, 3).
    pub const STOCH_RSI: Self = Self::StochRsi {
        rsi: 14,
        stoch: 14,
        k: 3,
        d: 3,
    };

    /// Standard fast stochastic(14, 3).
    pub const STOCHASTIC: Self = Self::Stochastic { k: 14, d: 3 };

    /// Standard MACD(12, 26, 9).
    pub const MACD: Self = Self::Macd {
        fast: 12,
        slow: 26,
        signal: 9,
    };

    /// Standard Bollinger(20, 2).
    pub const BOLLINGER: Self = Self::Bollinger { period: 20, k: 2.0 };

    /// Short label used as the row name in reports, e.g. `RSI(14)`.
    #[must_use]
    pub fn label(&self) -> String {
        match *self {
            Self::Sma(p) => format!("SMA({p})"),
            Self::Ema(p) => format!("EMA({p})"),
            Self::Dema(p) => format!("DEMA({p})"),
            Self::Wma(p) => format!("WMA({p})"),
            Self::Rsi(p) => format!("RSI({p})"),
            Self::StochRsi { rsi, stoch, k, d } => format!("StochRSI({rsi},{stoch},{k},{d})"),
            Self::Stochastic { k, d } => format!("Stochastic({k},{d})"),
            Self::Cci(p) => format!("CCI({p})"),
            Self::Momentum(p) => format!("Momentum({p})"),
            Self::Roc(p) => format!("ROC({p})"),
            Self::Macd { fast, slow, signal } => format!("MACD({fast},{slow},{signal})"),
            Self::Bollinger { period, k } => format!("Bollinger({period},{k})"),
            Self::Atr(p) => format!("ATR({p})"),
            Self::Adx(p) => format!("ADX({p})"),
        }
    }

    /// Number of candles the indicator needs to produce a value.
    #[must_use]
    pub fn min_history(&self) -> usize {
        match *self {
            Self::Sma(p) | Self::Ema(p) | Self::Wma(p) | Self::Cci(p) => p,
            Self::Dema(p) => (2 * p).saturating_sub(1),
            Self::Rsi(p) | Self::Momentum(p) | Self::Roc(p) | Self::Atr(p) => p + 1,
            Self::StochRsi { rsi, stoch, k, d } => (rsi + stoch + k + d).saturating_sub(2),
            Self::Stochastic { k, d } => (k + d).saturating_sub(1),
            Self::Macd { slow, signal, .. } => (slow + signal).saturating_sub(1),
            Self::Bollinger { period, .. } => period,
            Self::Adx(p) => 2 * p,
        }
    }

    /// Computes the indicator over a candle series.
    ///
    /// # Errors
    /// Propagates the underlying indicator's [`EngineError`].
    pub fn compute(&self, series: &CandleSeries) -> Result<IndicatorResult, EngineError> {
        tracing::trace!(indicator = %self.label(), candles = series.len(), "computing indicator");

        let closes = series.closes();
        let result = match *self {
            Self::Sma(p) => IndicatorResult::Value(sma(&closes, p)?),
            Self::Ema(p) => IndicatorResult::Value(ema(&closes, p)?),
            Self::Dema(p) => IndicatorResult::Value(dema(&closes, p)?),
            Self::Wma(p) => IndicatorResult::Value(wma(&closes, p)?),
            Self::Rsi(p) => IndicatorResult::Value(rsi(&closes, p)?),
            Self::StochRsi { rsi, stoch, k, d } => {
                IndicatorResult::Stochastic(stoch_rsi(&closes, rsi, stoch, k, d)?)
            }
            Self::Stochastic { k, d } => IndicatorResult::Stochastic(stochastic(
                &series.highs(),
                &series.lows(),
                &closes,
                k,
                d,
            )?),
            Self::Cci(p) => {
                IndicatorResult::Value(cci(&series.highs(), &series.lows(), &closes, p)?)
            }
            Self::Momentum(p) => IndicatorResult::Value(momentum(&closes, p)?),
            Self::Roc(p) => IndicatorResult::Value(roc(&closes, p)?),
            Self::Macd { fast, slow, signal } => {
                IndicatorResult::Macd(macd(&closes, fast, slow, signal)?)
            }
            Self::Bollinger { period, k } => {
                IndicatorResult::Bollinger(bollinger(&closes, period, k)?)
            }
            Self::Atr(p) => {
                IndicatorResult::Value(atr(&series.highs(), &series.lows(), &closes, p)?)
            }
            Self::Adx(p) => {
                IndicatorResult::Adx(adx(&series.highs(), &series.lows(), &closes, p)?)
            }
        };
        Ok(result)
    }
}

/// Typed output of an [`IndicatorSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum IndicatorResult {
    Value(f64),
    Macd(MacdOutput),
    Bollinger(BollingerBands),
    Stochastic(StochasticOutput),
    Adx(AdxOutput),
}

impl IndicatorResult {
    /// Named components in render order.
    #[must_use]
    pub fn components(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Self::Value(v) => vec![("value", v)],
            Self::Macd(m) => vec![
                ("macd", m.macd),
                ("signal", m.signal),
                ("histogram", m.histogram),
            ],
            Self::Bollinger(b) => vec![
                ("upper", b.upper),
                ("middle", b.middle),
                ("lower", b.lower),
            ],
            Self::Stochastic(s) => vec![("k", s.k), ("d", s.d)],
            Self::Adx(a) => vec![
                ("adx", a.adx),
                ("plus_di", a.plus_di),
                ("minus_di", a.minus_di),
            ],
        }
    }

    /// True when every component is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.components().iter().all(|(_, v)| v.is_finite())
    }
}
