use anyhow::Result;
use clap::Parser;
use nursery::config::AppConfig;
use nursery::server::ServerBuilder;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Nursery order intake and distribution service
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// YAML configuration file; defaults apply when omitted
    #[arg(long, short)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_yaml_file(path)?,
        None => AppConfig::default(),
    }
    .with_env_overrides()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        max_boxes = config.max_boxes,
        max_distribution_entries = config.max_distribution_entries,
        "configuration loaded"
    );

    ServerBuilder::new().with_config(config).serve().await
}
