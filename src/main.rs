use anyhow::Result;
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::logging::init(cli.verbose, cli.log_json);
    cli::run(cli).await
}
