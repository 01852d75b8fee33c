//! Sitekit - an asset pipeline for hand-written static sites.
//!
//! Compiles templated HTML, SASS and JavaScript, optimizes images, copies
//! fonts and vendor assets, and serves a live-reloading preview during
//! development. `sitekit build` produces the minified production tree.

mod cli;
mod config;
mod core;
mod logger;
mod pipeline;
mod reload;
mod serve;
mod task;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PipelineConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = PipelineConfig::load(&cli)?;

    match cli.command() {
        Commands::Dev { watch, .. } => pipeline::dev(&config, watch),
        Commands::Build => pipeline::prod(&config),
    }
}
