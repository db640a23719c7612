use super::config::TimeArgs;
use clap::Args;

#[derive(Debug, Args)]
pub struct QueryCommand {
    /// Chart kind the rows are reshaped into
    #[arg(short = 'k', long = "kind")]
    pub kind: String,

    /// Query template to execute
    #[arg(short = 'q', long = "sql", required = true, value_name = "QUERY")]
    pub query: String,

    #[command(flatten)]
    pub time: TimeArgs,
}
