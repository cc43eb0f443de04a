//! depviz CLI entrypoint

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use depviz::cli::Cli;
use depviz::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Parse CLI first so --help works even with a broken config file
    let cli = Cli::parse();

    // Configuration is loaded once here and passed down explicitly
    let config = Config::load()?;
    cli.execute(config).await
}
