//! sluice - an environment-aware build runner for front-end asset trees.

mod asset;
mod cli;
mod config;
mod core;
mod deploy;
mod fileset;
mod freshness;
mod logger;
mod pipeline;
mod task;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;

fn main() -> Result<()> {
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();
    if let Some(forced) = match cli.color {
        ColorChoice::Always => Some(true),
        ColorChoice::Never => Some(false),
        ColorChoice::Auto => None,
    } {
        owo_colors::set_override(forced);
    }
    logger::set_verbose(cli.verbose);

    cli::run(&cli)
}
