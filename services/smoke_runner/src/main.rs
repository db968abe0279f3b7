//! Smoke runner binary

use anyhow::{Context, Result};
use clap::Parser;
use smoke_runner::{exit_status, list_cases, run, Cli, ConsoleReporter, SUITE_NAME};
use std::{io, process::ExitCode};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.list {
        list_cases(&mut io::stdout().lock()).context("could not list cases")?;
        return Ok(ExitCode::SUCCESS);
    }

    // Initialize tracing; stdout is reserved for the suite output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.into_config().context("invalid configuration")?;
    info!(cases = config.cases.len(), "starting {SUITE_NAME}");

    println!("{SUITE_NAME}");
    let report = run(&config, &ConsoleReporter::new())
        .await
        .context("could not configure the execution context")?;

    Ok(ExitCode::from(exit_status(&report)))
}
