use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub binance: BinanceConfig,
    pub thresholds: Thresholds,
    pub book: BookConfig,
    /// Per-profile overrides keyed by profile name (e.g. `fifteen-minute`)
    pub profiles: BTreeMap<String, ProfileOverride>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinanceConfig {
    pub api_url: String,
    pub rate_limit_per_second: u32,
    pub timeout_secs: u64,
}

/// Classification thresholds shared by every profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Volume spike when volume > multiplier x window average
    pub spike_multiplier: f64,
    /// High-volatility candle when volatility % > multiplier x window average
    pub high_volatility_multiplier: f64,
    /// Body % of range below which a candle is a doji
    pub doji_body_pct: f64,
    /// Relative change (%) between first and last third for a volume trend
    pub volume_trend_pct: f64,
    /// Band (%) within which swing extrema are merged into one level
    pub sr_tolerance_pct: f64,
    /// Bars on each side a swing high/low must dominate
    pub swing_strength: usize,
    /// Maximum support and resistance levels reported per side
    pub max_sr_levels: usize,
    /// Fibonacci lookback in candles; whole window when unset
    pub fibonacci_lookback: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Levels requested per side
    pub depth: usize,
    /// Levels by quantity used for imbalance and shares
    pub top_levels: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOverride {
    /// Candle window length
    pub window: Option<usize>,
    /// Number of recent candles rendered
    pub recent_candles: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("unknown profile in configuration: {0}")]
    UnknownProfile(String),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.binance.com".to_string(),
            rate_limit_per_second: 10,
            timeout_secs: 10,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            spike_multiplier: 1.5,
            high_volatility_multiplier: 1.5,
            doji_body_pct: 10.0,
            volume_trend_pct: 10.0,
            sr_tolerance_pct: 0.5,
            swing_strength: 2,
            max_sr_levels: 5,
            fibonacci_lookback: None,
        }
    }
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            depth: 100,
            top_levels: 20,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Thresholds {
    /// # Errors
    /// Returns the first threshold that is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("thresholds.spike_multiplier", self.spike_multiplier),
            (
                "thresholds.high_volatility_multiplier",
                self.high_volatility_multiplier,
            ),
            ("thresholds.sr_tolerance_pct", self.sr_tolerance_pct),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(field, format!("must be > 0, got {value}")));
            }
        }
        if !(0.0..=100.0).contains(&self.doji_body_pct) {
            return Err(ConfigError::invalid(
                "thresholds.doji_body_pct",
                format!("must be within [0, 100], got {}", self.doji_body_pct),
            ));
        }
        if !(self.volume_trend_pct.is_finite() && self.volume_trend_pct >= 0.0) {
            return Err(ConfigError::invalid(
                "thresholds.volume_trend_pct",
                format!("must be >= 0, got {}", self.volume_trend_pct),
            ));
        }
        if self.swing_strength == 0 {
            return Err(ConfigError::invalid("thresholds.swing_strength", "must be >= 1"));
        }
        if self.max_sr_levels == 0 {
            return Err(ConfigError::invalid("thresholds.max_sr_levels", "must be >= 1"));
        }
        if self.fibonacci_lookback == Some(0) {
            return Err(ConfigError::invalid("thresholds.fibonacci_lookback", "must be >= 1"));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Validates everything that does not depend on the profile catalogue.
    ///
    /// # Errors
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if self.book.depth == 0 {
            return Err(ConfigError::invalid("book.depth", "must be >= 1"));
        }
        if self.book.top_levels == 0 {
            return Err(ConfigError::invalid("book.top_levels", "must be >= 1"));
        }
        if self.binance.rate_limit_per_second == 0 {
            return Err(ConfigError::invalid(
                "binance.rate_limit_per_second",
                "must be >= 1",
            ));
        }
        if self.binance.api_url.is_empty() {
            return Err(ConfigError::invalid("binance.api_url", "must not be empty"));
        }
        Ok(())
    }
}
