use super::config::TimeArgs;
use clap::Args;

#[derive(Debug, Args)]
pub struct ChartCommand {
    /// Component id
    pub id: String,

    #[command(flatten)]
    pub time: TimeArgs,
}

#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Component id
    pub id: String,

    #[command(flatten)]
    pub time: TimeArgs,
}

#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Component id
    pub id: i64,

    /// Chart kind (two_d, three_d, percent, time, map_legend)
    #[arg(short = 'k', long = "kind")]
    pub kind: String,

    /// Chart query template
    #[arg(long = "chart", value_name = "SQL")]
    pub chart: String,

    /// History query template
    #[arg(long = "history", value_name = "SQL", default_value = "")]
    pub history: String,
}
