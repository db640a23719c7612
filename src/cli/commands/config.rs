use clap::Args;

/// Logging options shared by every command
#[derive(Debug, Clone, Default, Args)]
pub struct LoggingConfig {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", env = "DASHQUERY_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log filter directives
    #[arg(long = "log-filter", env = "DASHQUERY_LOG_FILTER", global = true)]
    pub log_filter: Option<String>,
}

impl LoggingConfig {
    pub fn get_effective_level<'a>(&'a self, configured: &'a str) -> &'a str {
        match (self.verbose, self.log_level.as_deref()) {
            (v, _) if v >= 2 => "trace",
            (1, _) => "debug",
            (0, Some(level)) => level,
            _ => configured,
        }
    }
}

/// Optional time range for data commands
#[derive(Debug, Clone, Default, Args)]
pub struct TimeArgs {
    /// Range start, e.g. 2024-01-01T00:00:00+08:00
    #[arg(long = "time-from", value_name = "TIMESTAMP")]
    pub time_from: Option<String>,

    /// Range end, e.g. 2024-01-02T00:00:00+08:00
    #[arg(long = "time-to", value_name = "TIMESTAMP")]
    pub time_to: Option<String>,
}
