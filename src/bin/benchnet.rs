//! CLI entry point for running benchmark campaigns.

use std::path::PathBuf;

use benchnet::{
    BenchmarkExecutor, CampaignConfig, CampaignOrchestrator, ExecutorConfig, LifecycleConfig,
    NetworkLifecycleManager, ReportAggregator,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Run a benchmark campaign against ephemeral test networks.
#[derive(Debug, Parser)]
#[command(name = "benchnet", version)]
struct Cli {
    /// Path to the campaign configuration file.
    config: PathBuf,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if !cli.config.exists() {
        tracing::error!(path = %cli.config.display(), "Configuration file not found");
        std::process::exit(1);
    }

    let config = match CampaignConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load campaign configuration");
            std::process::exit(1);
        }
    };

    let lifecycle_config = LifecycleConfig::default();
    let reports = ReportAggregator::new(lifecycle_config.results_dir.clone());
    let lifecycle = NetworkLifecycleManager::new(lifecycle_config);
    let executor = BenchmarkExecutor::new(ExecutorConfig::default());

    let orchestrator = match CampaignOrchestrator::new(config, lifecycle, executor, reports) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build campaign orchestrator");
            std::process::exit(1);
        }
    };

    if orchestrator.run().await {
        tracing::info!("Campaign completed successfully");
    } else {
        tracing::error!("Campaign failed");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
