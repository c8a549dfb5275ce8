use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use market_report_core::config_loader::DEFAULT_CONFIG_PATH;
use market_report_core::{AppConfig, ConfigLoader};

mod commands;
mod source;

use commands::{AllArgs, ReportArgs, SnapshotArgs};

#[derive(Parser)]
#[command(name = "market-report")]
#[command(about = "Technical market analysis reports from exchange candles", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Read candles and books from a fixture directory instead of Binance
    #[arg(long, global = true, env = "MARKET_REPORT_FIXTURES")]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one profile for a symbol
    Report(ReportArgs),
    /// Render every profile for a symbol concurrently
    All(AllArgs),
    /// List the profile catalogue
    Profiles,
    /// Download candles and order book from Binance into a fixture directory
    Snapshot(SnapshotArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_from(&cli.config)?;
    init_logging(&config);

    let succeeded = match cli.command {
        Commands::Report(args) => {
            commands::run_report(&config, cli.fixtures.as_deref(), args).await?
        }
        Commands::All(args) => commands::run_all(&config, cli.fixtures.as_deref(), args).await?,
        Commands::Profiles => commands::run_profiles(&config)?,
        Commands::Snapshot(args) => commands::run_snapshot(&config, args).await?,
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Logs go to stderr so report text on stdout stays clean.
fn init_logging(config: &AppConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
