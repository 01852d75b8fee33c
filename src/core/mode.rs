//! Build mode: development vs production.

use crate::config::{CategoryPaths, Paths};

/// Which pipeline variant is running.
///
/// Development writes to `dist` (readable output, live reload); production
/// writes to `build` (minified/compressed output).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    pub fn is_prod(self) -> bool {
        matches!(self, Mode::Production)
    }

    /// Output target paths for this mode.
    pub fn target(self, paths: &Paths) -> &CategoryPaths {
        match self {
            Mode::Development => &paths.dist,
            Mode::Production => &paths.build,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Development => "dev",
            Mode::Production => "prod",
        }
    }
}
