//! Profile catalogue listing.

use anyhow::{Context, Result};
use market_report_core::AppConfig;
use market_report_engine::ProfileCatalog;

/// Prints every profile with its interval, window and indicators.
pub fn run_profiles(config: &AppConfig) -> Result<bool> {
    let catalog = ProfileCatalog::new(config).context("Invalid profile configuration")?;

    println!(
        "{:<16}{:>10}{:>8}  {}",
        "PROFILE", "INTERVAL", "WINDOW", "INDICATORS"
    );
    for profile in catalog.iter() {
        let interval = profile.interval.map_or("-", |i| i.as_str());
        let indicators = if profile.indicators.is_empty() {
            "-".to_string()
        } else {
            profile
                .indicators
                .iter()
                .map(|spec| spec.label())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "{:<16}{:>10}{:>8}  {}",
            profile.kind.name(),
            interval,
            profile.window,
            indicators
        );
    }
    Ok(true)
}
