//! Configuration error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading `sitekit.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("invalid paths: {0}")]
    InvalidPaths(String),
}
