mod cli;
mod control;
mod engine;
mod model;
mod orchestrator;
mod presets;
mod stats;
mod text_summary;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args).await
}
