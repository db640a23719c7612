//! dashquery binary.
//!
//! This binary provides the main entry point for the dashquery service, which serves
//! reshaped chart data for dashboard components from stored query templates.

use clap::Parser;
use dashquery_core::{
    cli::commands::Commands,
    cli::handlers::{
        handle_chart, handle_history, handle_query, handle_register, handle_server, handle_tables,
    },
    cli::Cli,
    config::Settings,
};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    // Initialize logging
    let level = cli.logging.get_effective_level(&settings.server.log_level);
    let filter = cli
        .logging
        .log_filter
        .clone()
        .or_else(|| std::env::var(EnvFilter::DEFAULT_ENV).ok())
        .unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.parse().unwrap_or(Level::INFO).into())
                .parse_lossy(filter),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    debug!(config = ?cli.config, "configuration loaded");

    match cli.command {
        Commands::Server(cmd) => handle_server(cmd, settings).await?,
        Commands::Chart(cmd) => handle_chart(cmd, settings).await?,
        Commands::History(cmd) => handle_history(cmd, settings).await?,
        Commands::Query(cmd) => handle_query(cmd, settings).await?,
        Commands::Tables => handle_tables(settings).await?,
        Commands::Register(cmd) => handle_register(cmd, settings).await?,
    }

    Ok(())
}
