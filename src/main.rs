use anyhow::Context;
use clap::Parser;
use trailiq_etl::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await.context("trailiq-etl run failed")
}
