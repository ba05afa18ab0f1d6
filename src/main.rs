use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = apikey_vault::cli::Cli::parse();
    cli.run()
}
