//! Pivot points, Fibonacci levels and support/resistance clusters.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use market_report_core::{ensure_len, Candle, EngineError, Level, LevelKind, Thresholds};

/// Fibonacci retracement ratios.
pub const RETRACEMENT_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Fibonacci extension ratios.
pub const EXTENSION_RATIOS: [f64; 3] = [1.272, 1.618, 2.618];

// ============================================================
// Pivots
// ============================================================

/// Classic floor-trader pivots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoints {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl PivotPoints {
    /// Classic pivots from a period's high, low and close.
    #[must_use]
    pub fn classic(high: f64, low: f64, close: f64) -> Self {
        let pivot = (high + low + close) / 3.0;
        let range = high - low;
        Self {
            pivot,
            r1: 2.0 * pivot - low,
            r2: pivot + range,
            r3: high + 2.0 * (pivot - low),
            s1: 2.0 * pivot - high,
            s2: pivot - range,
            s3: low - 2.0 * (high - pivot),
        }
    }

    /// Pivots from the last closed candle, i.e. the one before the newest.
    ///
    /// # Errors
    /// `InsufficientData` with fewer than two candles.
    pub fn from_last_closed(candles: &[Candle]) -> Result<Self, EngineError> {
        ensure_len("pivot points", candles, 2)?;
        let prior = &candles[candles.len() - 2];
        Ok(Self::classic(prior.high, prior.low, prior.close))
    }

    /// Levels from highest resistance to lowest support.
    #[must_use]
    pub fn to_levels(&self) -> Vec<Level> {
        [
            (self.r3, LevelKind::Resistance, "R3"),
            (self.r2, LevelKind::Resistance, "R2"),
            (self.r1, LevelKind::Resistance, "R1"),
            (self.pivot, LevelKind::Pivot, "P"),
            (self.s1, LevelKind::Support, "S1"),
            (self.s2, LevelKind::Support, "S2"),
            (self.s3, LevelKind::Support, "S3"),
        ]
        .into_iter()
        .map(|(price, kind, label)| Level::new(price, kind, label))
        .collect()
    }
}

// ============================================================
// Fibonacci
// ============================================================

/// Direction of the measured swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingDirection {
    /// Low came first, then the high
    Up,
    /// High came first, then the low
    Down,
}

impl SwingDirection {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Retracement and extension levels over one swing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FibonacciLevels {
    pub direction: SwingDirection,
    pub swing_high: f64,
    pub swing_low: f64,
    pub retracements: Vec<Level>,
    pub extensions: Vec<Level>,
}

impl FibonacciLevels {
    /// Measures the swing between the highest high and lowest low of the
    /// last `lookback` candles (all of them when `None`).
    ///
    /// # Errors
    /// `InsufficientData` for an empty window.
    pub fn from_candles(candles: &[Candle], lookback: Option<usize>) -> Result<Self, EngineError> {
        let window = match lookback {
            Some(n) => &candles[candles.len().saturating_sub(n)..],
            None => candles,
        };
        ensure_len("Fibonacci levels", window, 1)?;

        let (mut high_idx, mut low_idx) = (0, 0);
        for (i, c) in window.iter().enumerate() {
            if c.high > window[high_idx].high {
                high_idx = i;
            }
            if c.low < window[low_idx].low {
                low_idx = i;
            }
        }

        let swing_high = window[high_idx].high;
        let swing_low = window[low_idx].low;
        let range = swing_high - swing_low;
        let direction = if low_idx < high_idx {
            SwingDirection::Up
        } else {
            SwingDirection::Down
        };

        let retracements = RETRACEMENT_RATIOS
            .iter()
            .map(|&r| {
                let price = match direction {
                    SwingDirection::Up => swing_high - r * range,
                    SwingDirection::Down => swing_low + r * range,
                };
                Level::new(price, LevelKind::Fibonacci, format!("Fib {:.1}%", r * 100.0))
            })
            .collect();

        let extensions = EXTENSION_RATIOS
            .iter()
            .map(|&e| {
                let price = match direction {
                    SwingDirection::Up => swing_low + e * range,
                    SwingDirection::Down => swing_high - e * range,
                };
                Level::new(price, LevelKind::Fibonacci, format!("Ext {:.1}%", e * 100.0))
            })
            .collect();

        Ok(Self {
            direction,
            swing_high,
            swing_low,
            retracements,
            extensions,
        })
    }
}

// ============================================================
// Support / resistance
// ============================================================

/// Group of nearby swing extrema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelCluster {
    /// Mean of the clustered prices
    pub price: f64,
    /// Number of swing points merged into the cluster
    pub touches: usize,
    /// Signed distance from the last close, in percent
    pub distance_pct: f64,
}

/// Ranked support and resistance clusters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportResistance {
    pub supports: Vec<LevelCluster>,
    pub resistances: Vec<LevelCluster>,
}

impl SupportResistance {
    /// Flattens into labelled levels, resistances first.
    #[must_use]
    pub fn to_levels(&self) -> Vec<Level> {
        let resistances = self.resistances.iter().enumerate().map(|(i, c)| {
            Level::new(c.price, LevelKind::Resistance, format!("Resistance {}", i + 1))
        });
        let supports = self.supports.iter().enumerate().map(|(i, c)| {
            Level::new(c.price, LevelKind::Support, format!("Support {}", i + 1))
        });
        resistances.chain(supports).collect()
    }
}

/// Swing-point based level detector.
#[derive(Debug, Clone, Copy)]
pub struct LevelDetector {
    swing_strength: usize,
    tolerance_pct: f64,
    max_levels: usize,
    fibonacci_lookback: Option<usize>,
}

impl Default for LevelDetector {
    fn default() -> Self {
        Self::from_thresholds(&Thresholds::default())
    }
}

impl LevelDetector {
    #[must_use]
    pub fn from_thresholds(thresholds: &Thresholds) -> Self {
        Self {
            swing_strength: thresholds.swing_strength,
            tolerance_pct: thresholds.sr_tolerance_pct,
            max_levels: thresholds.max_sr_levels,
            fibonacci_lookback: thresholds.fibonacci_lookback,
        }
    }

    /// # Errors
    /// `InsufficientData` with fewer than two candles.
    pub fn pivots(&self, candles: &[Candle]) -> Result<PivotPoints, EngineError> {
        PivotPoints::from_last_closed(candles)
    }

    /// # Errors
    /// `InsufficientData` for an empty window.
    pub fn fibonacci(&self, candles: &[Candle]) -> Result<FibonacciLevels, EngineError> {
        FibonacciLevels::from_candles(candles, self.fibonacci_lookback)
    }

    /// Clusters swing highs and lows into ranked support and resistance.
    ///
    /// A bar is a swing high (low) when its high (low) is at least (at most)
    /// every bar within `swing_strength` bars on either side. Clusters below
    /// the last close are supports, the rest resistances.
    ///
    /// # Errors
    /// `InsufficientData` with fewer than `2 * swing_strength + 1` candles.
    pub fn support_resistance(&self, candles: &[Candle]) -> Result<SupportResistance, EngineError> {
        let w = self.swing_strength;
        ensure_len("support/resistance", candles, 2 * w + 1)?;

        let mut extrema = Vec::new();
        for i in w..candles.len() - w {
            let neighbours = &candles[i - w..=i + w];
            if neighbours.iter().all(|c| candles[i].high >= c.high) {
                extrema.push(candles[i].high);
            }
            if neighbours.iter().all(|c| candles[i].low <= c.low) {
                extrema.push(candles[i].low);
            }
        }
        extrema.sort_by(f64::total_cmp);

        let last_close = candles[candles.len() - 1].close;
        let clusters = self.cluster(&extrema, last_close);

        let (mut supports, mut resistances): (Vec<_>, Vec<_>) =
            clusters.into_iter().partition(|c| c.price < last_close);
        rank(&mut supports, self.max_levels);
        rank(&mut resistances, self.max_levels);

        tracing::debug!(
            swing_points = extrema.len(),
            supports = supports.len(),
            resistances = resistances.len(),
            "detected support/resistance"
        );

        Ok(SupportResistance {
            supports,
            resistances,
        })
    }

    fn cluster(&self, sorted: &[f64], last_close: f64) -> Vec<LevelCluster> {
        let mut clusters: Vec<(f64, usize)> = Vec::new();
        for &price in sorted {
            match clusters.last_mut() {
                Some((sum, count)) if within(price, *sum / *count as f64, self.tolerance_pct) => {
                    *sum += price;
                    *count += 1;
                }
                _ => clusters.push((price, 1)),
            }
        }

        clusters
            .into_iter()
            .map(|(sum, touches)| {
                let price = sum / touches as f64;
                let distance_pct = if last_close == 0.0 {
                    0.0
                } else {
                    (price - last_close) / last_close * 100.0
                };
                LevelCluster {
                    price,
                    touches,
                    distance_pct,
                }
            })
            .collect()
    }
}

fn within(price: f64, mean: f64, tolerance_pct: f64) -> bool {
    if mean == 0.0 {
        return price == 0.0;
    }
    ((price - mean) / mean).abs() * 100.0 <= tolerance_pct
}

/// Touches descending, then nearest to the last close.
fn rank(clusters: &mut Vec<LevelCluster>, max: usize) {
    clusters.sort_by(|a, b| {
        b.touches.cmp(&a.touches).then_with(|| {
            a.distance_pct
                .abs()
                .partial_cmp(&b.distance_pct.abs())
                .unwrap_or(Ordering::Equal)
        })
    });
    clusters.truncate(max);
}
