//! Command-line interface module.
//!
//! This module provides the CLI functionality for:
//! - Server management
//! - Component chart and history queries
//! - Ad-hoc template execution
//! - Component registration

pub mod commands;
pub mod handlers;

use clap::Parser;
use commands::{Commands, LoggingConfig};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingConfig,
}
