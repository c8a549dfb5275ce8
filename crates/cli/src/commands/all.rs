//! Every profile for one symbol, rendered concurrently.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use futures_util::future::join_all;
use market_report_core::AppConfig;
use market_report_engine::ReportPayload;

use crate::source::build_engine;

/// Arguments for the all command.
#[derive(Args, Debug, Clone)]
pub struct AllArgs {
    /// Trading symbol (e.g., BTCUSDT)
    pub symbol: String,

    /// Print a JSON array of payloads instead of report text
    #[arg(long)]
    pub json: bool,
}

/// Renders every catalogue profile. Returns false if any report failed.
pub async fn run_all(config: &AppConfig, fixtures: Option<&Path>, args: AllArgs) -> Result<bool> {
    let engine = build_engine(config, fixtures)?;

    let kinds: Vec<_> = engine.catalog().iter().map(|profile| profile.kind).collect();
    let results = join_all(
        kinds
            .iter()
            .map(|&kind| engine.generate_report(kind, &args.symbol)),
    )
    .await;

    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(
        symbol = %args.symbol,
        reports = results.len(),
        failed,
        "all profiles rendered"
    );

    if args.json {
        let payloads: Vec<ReportPayload> = results.into_iter().map(ReportPayload::from).collect();
        println!("{}", serde_json::to_string(&payloads)?);
    } else {
        for (kind, result) in kinds.iter().zip(results) {
            match result {
                Ok(report) => {
                    print!("{}", report.text);
                    println!();
                }
                Err(e) => eprintln!("{kind}: error [{}]: {}", e.kind(), e),
            }
        }
    }
    Ok(failed == 0)
}
