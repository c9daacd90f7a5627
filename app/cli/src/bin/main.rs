//! oopilot binary entry point.

use anyhow::Result;
use clap::Parser;
use oopilot_cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_tracing();
    cli.run().await
}
