mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use finagg_core::{MarketDataService, ReqwestHttpClient};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run().await {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let service = MarketDataService::builder()
        .with_env_providers(Arc::new(ReqwestHttpClient::new()))
        .build()?;

    let data = commands::run(&cli, &service).await?;
    output::render(&data, cli.pretty)?;

    Ok(())
}
