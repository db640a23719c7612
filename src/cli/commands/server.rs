use clap::Args;

#[derive(Debug, Args)]
pub struct ServerCommand {
    /// Listen address in host:port format
    #[arg(long, value_name = "HOST:PORT")]
    pub listen: Option<String>,
}
