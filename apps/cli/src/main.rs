//! kbagent CLI: knowledge-base ingestion and local query runner.
//!
//! Ingests CSV files into a managed knowledge base and runs the
//! knowledge-grounded query handler from the terminal.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
