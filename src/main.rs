//! zimvault - migrate a Zim desktop wiki notebook into a markdown vault.

mod address;
mod cli;
mod config;
mod core;
mod image;
mod logger;
mod markup;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::MigrateConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.is_verbose());

    let config = MigrateConfig::load(&cli)?;

    match &cli.command {
        Commands::Migrate { .. } => cli::migrate::migrate_vault(&config),
        Commands::Plan { .. } => cli::plan::plan_vault(&config),
    }
}
