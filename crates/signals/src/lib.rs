//! Analyzers over candle windows and order book snapshots.

pub mod candles;
pub mod levels;
pub mod orderbook;
pub mod slope;
pub mod volume;

pub use candles::{CandleAnalysis, CandleClassifier, CandleKind, CandleStats, CandleSummary};
pub use levels::{
    FibonacciLevels, LevelCluster, LevelDetector, PivotPoints, SupportResistance, SwingDirection,
    EXTENSION_RATIOS, RETRACEMENT_RATIOS,
};
pub use orderbook::{depth_imbalance, BookLevel, OrderBookAnalysis, OrderBookAnalyzer, Side};
pub use slope::{linear_regression, pearson_correlation, LinearFit, SlopeAnalysis, SlopeAnalyzer};
pub use volume::{VolumeAnalysis, VolumeAnalyzer, VolumeSpike, VolumeTrend};
