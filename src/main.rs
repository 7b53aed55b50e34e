use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris::cli::{self, context::AppContext, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON/YAML output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "libris=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        return cli::commands::init().await;
    }

    let ctx = AppContext::from_cli(&cli)?;
    cli::commands::run(&ctx, cli.command).await
}
