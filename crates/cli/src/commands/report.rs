//! Single report command.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use market_report_core::AppConfig;
use market_report_engine::{ProfileKind, ReportPayload};

use crate::source::build_engine;

/// Arguments for the report command.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Profile name (one-minute, fifteen-minute, thirty-minute, hour,
    /// short-term, swing-term, long-term, volume, book, slope)
    pub profile: ProfileKind,

    /// Trading symbol (e.g., BTCUSDT)
    pub symbol: String,

    /// Print a JSON payload instead of report text
    #[arg(long)]
    pub json: bool,
}

/// Renders one report to stdout. Returns false when the report failed.
pub async fn run_report(
    config: &AppConfig,
    fixtures: Option<&Path>,
    args: ReportArgs,
) -> Result<bool> {
    let engine = build_engine(config, fixtures)?;
    let result = engine.generate_report(args.profile, &args.symbol).await;
    let succeeded = result.is_ok();

    if args.json {
        println!("{}", ReportPayload::from(result).to_json()?);
    } else {
        match result {
            Ok(report) => print!("{}", report.text),
            Err(e) => eprintln!("Error [{}]: {}", e.kind(), e),
        }
    }
    Ok(succeeded)
}
