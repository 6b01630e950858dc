//! docview CLI: generate documentation for a repository and browse it.
//!
//! Submits a generation job to the docview backend, follows it to
//! completion, and prints the resulting outline.

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
