//! ContentForge CLI: recipe-driven content schema and layer index tooling.
//!
//! Applies recipes to a site database, manages content items, and queries
//! the layer metadata index.

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
