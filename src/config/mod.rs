//! Pipeline configuration management for `sitekit.toml`.
//!
//! # Sections
//!
//! | Section           | Purpose                                         |
//! |-------------------|-------------------------------------------------|
//! | `[paths.src]`     | Source category roots                           |
//! | `[paths.dist]`    | Development output target                       |
//! | `[paths.build]`   | Production output target                        |
//! | `[tools]`         | Preview port, image encoder quality             |
//!
//! The file is optional: a missing config means the conventional layout.
//! Unknown keys are reported as warnings, never errors.

mod error;
mod paths;
mod tools;

pub use error::ConfigError;
pub use paths::{CategoryPaths, Paths};
pub use tools::{
    DEFAULT_JPEG_QUALITY, DEFAULT_PNG_QUALITY, DEFAULT_PORT, ImageQuality, Tools,
};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, Commands};
use crate::log;

/// Root configuration structure representing sitekit.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory layout.
    pub paths: Paths,

    /// Tool options.
    pub tools: Tools,
}

impl PipelineConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Reads `cli.config` if it exists, otherwise falls back to defaults.
    /// CLI overrides (e.g. `--port`) are applied afterwards.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = if cli.config.is_file() {
            Self::from_path(&cli.config)?
        } else {
            log!("config"; "no config file at '{}', using defaults", cli.config.display());
            Self::default()
        };

        config.config_path = cli.config.clone();
        config.apply_cli(cli);
        config.paths.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        let de = toml::de::Deserializer::new(content);
        let mut unknown = Vec::new();
        let config: Self = serde_ignored::deserialize(de, |path| unknown.push(path.to_string()))?;
        for key in unknown {
            log!("config"; "unknown key '{}' (ignored)", key);
        }
        Ok(config)
    }

    /// Load configuration from a file path with unknown-field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Apply command-line overrides to the loaded configuration.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(Commands::Dev { port: Some(port), .. }) = &cli.command {
            self.tools.port = *port;
        }
    }
}
