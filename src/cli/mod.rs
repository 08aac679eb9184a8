//! Command-line interface for the Aurora resource format tools

pub mod commands;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "aurorafmt")]
#[command(about = "Aurora engine resource format tools (GFF, ERF, 2DA)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the aurorafmt CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
