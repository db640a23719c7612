pub mod component;
pub mod config;
pub mod server;
pub mod sql;

pub use component::{ChartCommand, HistoryCommand, RegisterCommand};
pub use config::{LoggingConfig, TimeArgs};
pub use server::ServerCommand;
pub use sql::QueryCommand;

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Server(ServerCommand),
    /// Print chart data for a component
    Chart(ChartCommand),
    /// Print history data for a component
    History(HistoryCommand),
    /// Run an ad-hoc template and print the reshaped rows
    Query(QueryCommand),
    /// List tables in the dashboard store
    Tables,
    /// Register or replace a component definition
    Register(RegisterCommand),
}
