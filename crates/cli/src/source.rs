//! Candle source selection.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use market_report_binance::BinanceClient;
use market_report_core::{AppConfig, CandleSource};
use market_report_data::CsvCandleSource;
use market_report_engine::ReportEngine;

/// Fixture directory when given, Binance otherwise.
pub fn build_source(config: &AppConfig, fixtures: Option<&Path>) -> Result<Arc<dyn CandleSource>> {
    match fixtures {
        Some(dir) => {
            anyhow::ensure!(
                dir.is_dir(),
                "Fixture directory does not exist: {}",
                dir.display()
            );
            let source = CsvCandleSource::new(dir);
            tracing::info!(dir = %source.dir().display(), "using fixture candle source");
            Ok(Arc::new(source))
        }
        None => {
            let client = BinanceClient::from_config(&config.binance)
                .context("Failed to create Binance client")?;
            tracing::info!(url = client.base_url(), "using Binance candle source");
            Ok(Arc::new(client))
        }
    }
}

pub fn build_engine(config: &AppConfig, fixtures: Option<&Path>) -> Result<ReportEngine> {
    let source = build_source(config, fixtures)?;
    ReportEngine::new(source, config).context("Invalid profile configuration")
}
