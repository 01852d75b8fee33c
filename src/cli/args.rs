//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Sitekit asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sitekit.toml)
    #[arg(short = 'C', long, default_value = "sitekit.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Subcommand (defaults to `dev` when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Clean, build and serve the development output with live reload
    #[command(visible_alias = "d")]
    Dev {
        /// Port number for the preview server
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching for auto-rebuild
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false, default_value = "true")]
        watch: bool,
    },

    /// Produce the minified production output
    #[command(visible_alias = "b")]
    Build,
}

impl Cli {
    /// Effective command: bare `sitekit` means `sitekit dev`.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Dev {
            port: None,
            watch: true,
        })
    }
}
