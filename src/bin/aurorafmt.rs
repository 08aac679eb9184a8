//! aurorafmt command-line entry point

fn main() -> anyhow::Result<()> {
    aurorafmt::cli::run_cli()
}
