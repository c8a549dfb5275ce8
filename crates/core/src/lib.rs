pub mod candle;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod format;
pub mod level;
pub mod orderbook;
pub mod traits;

pub use candle::{Candle, CandleSeries, Interval};
pub use config::{
    AppConfig, BinanceConfig, BookConfig, ConfigError, LoggingConfig, ProfileOverride, Thresholds,
};
pub use config_loader::ConfigLoader;
pub use error::{checked_div, ensure_finite, ensure_len, EngineError, ErrorKind};
pub use level::{Level, LevelKind};
pub use orderbook::{OrderBookSnapshot, PriceLevel};
pub use traits::CandleSource;
