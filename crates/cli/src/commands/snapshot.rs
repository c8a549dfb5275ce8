//! Snapshot command.
//!
//! Downloads, for every interval the catalogue uses, as many candles as the
//! largest profile window on that interval, plus one order book, and writes
//! them in the layout `--fixtures` reads.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use market_report_binance::BinanceClient;
use market_report_core::{AppConfig, CandleSource};
use market_report_data::{book_path, candle_path, CsvStorage};
use market_report_engine::ProfileCatalog;

/// Arguments for the snapshot command.
#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Trading symbol (e.g., BTCUSDT)
    pub symbol: String,

    /// Output fixture directory
    #[arg(short, long, default_value = "fixtures")]
    pub output: PathBuf,
}

pub async fn run_snapshot(config: &AppConfig, args: SnapshotArgs) -> Result<bool> {
    let catalog = ProfileCatalog::new(config).context("Invalid profile configuration")?;
    let client =
        BinanceClient::from_config(&config.binance).context("Failed to create Binance client")?;
    let symbol = args.symbol.trim().to_ascii_uppercase();

    std::fs::create_dir_all(&args.output).with_context(|| {
        format!("Failed to create output directory: {}", args.output.display())
    })?;

    let mut windows = BTreeMap::new();
    for profile in catalog.iter() {
        if let Some(interval) = profile.interval {
            let window = windows.entry(interval.minutes()).or_insert((interval, 0));
            window.1 = window.1.max(profile.window);
        }
    }

    for (interval, count) in windows.into_values() {
        let series = client
            .fetch_candles(&symbol, interval, count)
            .await
            .with_context(|| format!("Failed to fetch {interval} candles for {symbol}"))?;
        let path = candle_path(&args.output, &symbol, interval);
        CsvStorage::write_candles(&path, series.candles())?;
        println!("Wrote {} {} candles to {}", series.len(), interval, path.display());
    }

    let book = client
        .fetch_order_book(&symbol, config.book.depth)
        .await
        .with_context(|| format!("Failed to fetch order book for {symbol}"))?;
    let path = book_path(&args.output, &symbol);
    CsvStorage::write_book(&path, &book)?;
    println!(
        "Wrote order book ({} bids / {} asks) to {}",
        book.bids.len(),
        book.asks.len(),
        path.display()
    );

    Ok(true)
}
