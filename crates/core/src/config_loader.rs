use crate::config::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

/// Environment variable prefix; nested keys use `__`, e.g.
/// `MARKET_REPORT_BOOK__TOP_LEVELS=10`.
pub const ENV_PREFIX: &str = "MARKET_REPORT_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering defaults, the default TOML file and
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed or fails validation.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration from a specific TOML file. A missing file leaves
    /// the defaults in place.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed or fails validation.
    pub fn load_from(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::figment(path)
            .extract()
            .with_context(|| format!("Failed to load configuration from {path}"))?;

        config.validate()?;
        tracing::debug!("Configuration loaded from {}", path);
        Ok(config)
    }

    fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
