//! Volume spikes and trend over a candle window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use market_report_core::{ensure_len, Candle, EngineError, Thresholds};

/// Direction of volume between the earliest and latest thirds of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl VolumeTrend {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "Increasing",
            Self::Decreasing => "Decreasing",
            Self::Stable => "Stable",
        }
    }
}

/// A candle whose volume exceeds the spike cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeSpike {
    pub open_time: DateTime<Utc>,
    pub volume: f64,
    /// Volume / window average
    pub ratio: f64,
}

/// Volume statistics for a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeAnalysis {
    pub average_volume: f64,
    pub last_volume: f64,
    /// Last volume / average, 0 when the average is 0
    pub last_ratio: f64,
    pub max_volume: f64,
    pub max_volume_time: DateTime<Utc>,
    pub spikes: Vec<VolumeSpike>,
    pub trend: VolumeTrend,
    /// Relative change of the latest third versus the earliest, in percent.
    /// `None` when the earliest third has no volume.
    pub trend_change_pct: Option<f64>,
}

/// Volume spike and trend detector.
#[derive(Debug, Clone, Copy)]
pub struct VolumeAnalyzer {
    spike_multiplier: f64,
    trend_threshold_pct: f64,
}

impl Default for VolumeAnalyzer {
    fn default() -> Self {
        Self::from_thresholds(&Thresholds::default())
    }
}

impl VolumeAnalyzer {
    #[must_use]
    pub fn from_thresholds(thresholds: &Thresholds) -> Self {
        Self {
            spike_multiplier: thresholds.spike_multiplier,
            trend_threshold_pct: thresholds.volume_trend_pct,
        }
    }

    /// # Errors
    /// `InsufficientData` with fewer than three candles.
    pub fn analyze(&self, candles: &[Candle]) -> Result<VolumeAnalysis, EngineError> {
        ensure_len("volume analysis", candles, 3)?;

        let average_volume = candles.iter().map(|c| c.volume).sum::<f64>() / candles.len() as f64;
        let ratio_of = |volume: f64| {
            if average_volume == 0.0 {
                0.0
            } else {
                volume / average_volume
            }
        };

        let cutoff = self.spike_multiplier * average_volume;
        let spikes: Vec<VolumeSpike> = candles
            .iter()
            .filter(|c| c.volume > cutoff)
            .map(|c| VolumeSpike {
                open_time: c.open_time,
                volume: c.volume,
                ratio: ratio_of(c.volume),
            })
            .collect();

        // First maximum wins on ties
        let max = candles
            .iter()
            .skip(1)
            .fold(&candles[0], |best, c| if c.volume > best.volume { c } else { best });

        let last = &candles[candles.len() - 1];
        let (trend, trend_change_pct) = self.trend(candles);

        tracing::debug!(
            candles = candles.len(),
            average_volume,
            spikes = spikes.len(),
            trend = trend.as_str(),
            "analyzed volume"
        );

        Ok(VolumeAnalysis {
            average_volume,
            last_volume: last.volume,
            last_ratio: ratio_of(last.volume),
            max_volume: max.volume,
            max_volume_time: max.open_time,
            spikes,
            trend,
            trend_change_pct,
        })
    }

    fn trend(&self, candles: &[Candle]) -> (VolumeTrend, Option<f64>) {
        let third = candles.len() / 3;
        let mean = |slice: &[Candle]| slice.iter().map(|c| c.volume).sum::<f64>() / slice.len() as f64;

        let early = mean(&candles[..third]);
        let recent = mean(&candles[candles.len() - third..]);

        if early == 0.0 {
            let trend = if recent > 0.0 {
                VolumeTrend::Increasing
            } else {
                VolumeTrend::Stable
            };
            return (trend, None);
        }

        let change_pct = (recent - early) / early * 100.0;
        let trend = if change_pct > self.trend_threshold_pct {
            VolumeTrend::Increasing
        } else if change_pct < -self.trend_threshold_pct {
            VolumeTrend::Decreasing
        } else {
            VolumeTrend::Stable
        };
        (trend, Some(change_pct))
    }
}
