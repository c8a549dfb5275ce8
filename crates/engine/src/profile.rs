//! Report profiles and the validated profile catalogue.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use market_report_core::{AppConfig, ConfigError, Interval};
use market_report_indicators::IndicatorSpec;
use market_report_signals::SlopeAnalyzer;

/// Largest window a single klines request can return.
pub const MAX_WINDOW: usize = 1000;

/// Recent candles rendered at the bottom of candle-based reports.
pub const DEFAULT_RECENT_CANDLES: usize = 10;

/// Every report the engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    OneMinute,
    FifteenMinute,
    ThirtyMinute,
    Hour,
    ShortTerm,
    SwingTerm,
    LongTerm,
    Volume,
    Book,
    Slope,
}

impl ProfileKind {
    pub const ALL: [Self; 10] = [
        Self::OneMinute,
        Self::FifteenMinute,
        Self::ThirtyMinute,
        Self::Hour,
        Self::ShortTerm,
        Self::SwingTerm,
        Self::LongTerm,
        Self::Volume,
        Self::Book,
        Self::Slope,
    ];

    /// Kebab-case name used on the command line and in configuration.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OneMinute => "one-minute",
            Self::FifteenMinute => "fifteen-minute",
            Self::ThirtyMinute => "thirty-minute",
            Self::Hour => "hour",
            Self::ShortTerm => "short-term",
            Self::SwingTerm => "swing-term",
            Self::LongTerm => "long-term",
            Self::Volume => "volume",
            Self::Book => "book",
            Self::Slope => "slope",
        }
    }

    /// Heading printed in the report banner.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::OneMinute => "1-MINUTE TECHNICAL REPORT",
            Self::FifteenMinute => "15-MINUTE TECHNICAL REPORT",
            Self::ThirtyMinute => "30-MINUTE TECHNICAL REPORT",
            Self::Hour => "HOURLY TECHNICAL REPORT",
            Self::ShortTerm => "SHORT-TERM OUTLOOK",
            Self::SwingTerm => "SWING-TERM OUTLOOK",
            Self::LongTerm => "LONG-TERM OUTLOOK",
            Self::Volume => "VOLUME REPORT",
            Self::Book => "ORDER BOOK REPORT",
            Self::Slope => "SLOPE REPORT",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProfileKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownProfile(s.to_string()))
    }
}

/// Optional blocks a profile renders after its indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Blocks {
    pub pivots: bool,
    pub fibonacci: bool,
    pub support_resistance: bool,
    pub volume: bool,
    /// Volume moving average period, rendered in the volume block
    pub vma_period: Option<usize>,
    pub slope: Option<SlopeAnalyzer>,
    pub order_book: bool,
    pub candles: bool,
}

/// Everything the pipeline needs to produce one report.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileConfig {
    pub kind: ProfileKind,
    /// Candle granularity; `None` for book-only profiles
    pub interval: Option<Interval>,
    /// Candles fetched and analyzed
    pub window: usize,
    pub indicators: Vec<IndicatorSpec>,
    pub blocks: Blocks,
    pub recent_candles: usize,
}

impl ProfileConfig {
    /// Built-in definition of a profile.
    #[must_use]
    pub fn builtin(kind: ProfileKind) -> Self {
        use IndicatorSpec as I;

        let levels = Blocks {
            pivots: true,
            fibonacci: true,
            support_resistance: true,
            candles: true,
            ..Blocks::default()
        };

        let (interval, window, indicators, blocks) = match kind {
            ProfileKind::OneMinute => (
                Some(Interval::OneMinute),
                60,
                vec![
                    I::Sma(7),
                    I::Sma(25),
                    I::Ema(9),
                    I::Ema(21),
                    I::Rsi(14),
                    I::STOCH_RSI,
                    I::MACD,
                    I::BOLLINGER,
                    I::Atr(14),
                ],
                Blocks {
                    pivots: true,
                    candles: true,
                    ..Blocks::default()
                },
            ),
            ProfileKind::FifteenMinute => (
                Some(Interval::FifteenMinutes),
                96,
                vec![
                    I::Sma(20),
                    I::Sma(50),
                    I::Ema(12),
                    I::Ema(26),
                    I::Rsi(14),
                    I::STOCH_RSI,
                    I::MACD,
                    I::BOLLINGER,
                    I::Atr(14),
                    I::Adx(14),
                ],
                levels,
            ),
            ProfileKind::ThirtyMinute => (
                Some(Interval::ThirtyMinutes),
                96,
                vec![
                    I::Sma(20),
                    I::Sma(50),
                    I::Ema(20),
                    I::Dema(20),
                    I::Rsi(14),
                    I::MACD,
                    I::BOLLINGER,
                    I::Cci(20),
                    I::Atr(14),
                    I::Adx(14),
                ],
                levels,
            ),
            ProfileKind::Hour => (
                Some(Interval::OneHour),
                100,
                vec![
                    I::Sma(20),
                    I::Sma(50),
                    I::Ema(20),
                    I::Ema(50),
                    I::Wma(20),
                    I::Rsi(14),
                    I::STOCHASTIC,
                    I::MACD,
                    I::BOLLINGER,
                    I::Atr(14),
                    I::Adx(14),
                ],
                levels,
            ),
            ProfileKind::ShortTerm => (
                Some(Interval::FifteenMinutes),
                100,
                vec![
                    I::Ema(9),
                    I::Ema(21),
                    I::Rsi(7),
                    I::STOCH_RSI,
                    I::Momentum(10),
                    I::Roc(10),
                    I::STOCHASTIC,
                    I::BOLLINGER,
                    I::Atr(14),
                ],
                Blocks {
                    pivots: true,
                    support_resistance: true,
                    volume: true,
                    candles: true,
                    ..Blocks::default()
                },
            ),
            ProfileKind::SwingTerm => (
                Some(Interval::FourHours),
                120,
                vec![
                    I::Sma(20),
                    I::Sma(50),
                    I::Sma(100),
                    I::Ema(21),
                    I::MACD,
                    I::Rsi(14),
                    I::Adx(14),
                    I::Cci(20),
                    I::Atr(14),
                    I::BOLLINGER,
                ],
                Blocks {
                    volume: true,
                    ..levels
                },
            ),
            ProfileKind::LongTerm => (
                Some(Interval::OneDay),
                220,
                vec![
                    I::Sma(50),
                    I::Sma(200),
                    I::Ema(50),
                    I::Ema(200),
                    I::MACD,
                    I::Rsi(14),
                    I::Adx(14),
                    I::Roc(30),
                    I::Atr(14),
                ],
                levels,
            ),
            ProfileKind::Volume => (
                Some(Interval::OneHour),
                72,
                Vec::new(),
                Blocks {
                    volume: true,
                    vma_period: Some(20),
                    candles: true,
                    ..Blocks::default()
                },
            ),
            ProfileKind::Book => (
                None,
                0,
                Vec::new(),
                Blocks {
                    order_book: true,
                    ..Blocks::default()
                },
            ),
            ProfileKind::Slope => (
                Some(Interval::OneMinute),
                120,
                Vec::new(),
                Blocks {
                    slope: Some(SlopeAnalyzer::default()),
                    candles: true,
                    ..Blocks::default()
                },
            ),
        };

        Self {
            kind,
            interval,
            window,
            indicators,
            blocks,
            recent_candles: if blocks.candles {
                DEFAULT_RECENT_CANDLES
            } else {
                0
            },
        }
    }

    /// True when the profile fetches candles.
    #[must_use]
    pub fn needs_candles(&self) -> bool {
        self.interval.is_some()
    }

    /// Smallest window that satisfies every indicator and block.
    #[must_use]
    pub fn min_history(&self, swing_strength: usize) -> usize {
        let mut required = self
            .indicators
            .iter()
            .map(IndicatorSpec::min_history)
            .max()
            .unwrap_or(0);
        if self.blocks.pivots {
            required = required.max(2);
        }
        if self.blocks.support_resistance {
            required = required.max(2 * swing_strength + 1);
        }
        if self.blocks.volume {
            required = required.max(3);
        }
        if let Some(period) = self.blocks.vma_period {
            required = required.max(period);
        }
        if let Some(slope) = self.blocks.slope {
            required = required.max(slope.min_history());
        }
        if self.blocks.candles {
            required = required.max(1);
        }
        required
    }

    /// # Errors
    /// Returns the first constraint the profile violates.
    pub fn validate(&self, swing_strength: usize) -> Result<(), ConfigError> {
        let field = |name: &str| format!("profiles.{}.{name}", self.kind);

        for spec in &self.indicators {
            if spec.min_history() == 0 {
                return Err(ConfigError::invalid(
                    field("indicators"),
                    format!("{} has a zero period", spec.label()),
                ));
            }
            if let IndicatorSpec::Macd { fast, slow, .. } = *spec {
                if fast >= slow {
                    return Err(ConfigError::invalid(
                        field("indicators"),
                        format!("{} fast period must be below slow", spec.label()),
                    ));
                }
            }
        }

        if !self.needs_candles() {
            if self.window != 0 || self.recent_candles != 0 {
                return Err(ConfigError::invalid(
                    field("window"),
                    "profile does not use candles",
                ));
            }
            return Ok(());
        }

        let required = self.min_history(swing_strength);
        if self.window < required {
            return Err(ConfigError::invalid(
                field("window"),
                format!("{} is below the minimum history {required}", self.window),
            ));
        }
        if self.window > MAX_WINDOW {
            return Err(ConfigError::invalid(
                field("window"),
                format!("{} exceeds the maximum of {MAX_WINDOW}", self.window),
            ));
        }
        if self.recent_candles > self.window {
            return Err(ConfigError::invalid(
                field("recent_candles"),
                format!("{} exceeds the window {}", self.recent_candles, self.window),
            ));
        }
        Ok(())
    }
}

/// Validated profile definitions, one per [`ProfileKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCatalog {
    profiles: BTreeMap<ProfileKind, ProfileConfig>,
}

impl ProfileCatalog {
    /// Builds the catalogue from the built-in profiles and the overrides in
    /// `config.profiles`, validating every profile.
    ///
    /// # Errors
    /// [`ConfigError::UnknownProfile`] for an override naming no profile,
    /// [`ConfigError::Invalid`] for a profile that fails validation.
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        let mut profiles: BTreeMap<ProfileKind, ProfileConfig> = ProfileKind::ALL
            .into_iter()
            .map(|kind| (kind, ProfileConfig::builtin(kind)))
            .collect();

        for (name, overrides) in &config.profiles {
            let kind: ProfileKind = name.parse()?;
            if let Some(profile) = profiles.get_mut(&kind) {
                if let Some(window) = overrides.window {
                    profile.window = window;
                }
                if let Some(recent) = overrides.recent_candles {
                    profile.recent_candles = recent;
                }
            }
        }

        Self::from_profiles(profiles.into_values(), config.thresholds.swing_strength)
    }

    /// Builds a catalogue from explicit profile definitions.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] for a profile that fails validation.
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = ProfileConfig>,
        swing_strength: usize,
    ) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for profile in profiles {
            profile.validate(swing_strength)?;
            map.insert(profile.kind, profile);
        }
        tracing::debug!(profiles = map.len(), "profile catalogue validated");
        Ok(Self { profiles: map })
    }

    /// Profile definition, if present in this catalogue.
    #[must_use]
    pub fn get(&self, kind: ProfileKind) -> Option<&ProfileConfig> {
        self.profiles.get(&kind)
    }

    /// Profiles in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ProfileConfig> {
        self.profiles.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
