//! Output directory cleanup.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use crate::log;

/// Remove an output directory and everything under it.
///
/// A missing directory is a no-op: the point is a clean slate, and an
/// absent tree already is one.
pub fn clean_target(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            log!("clean"; "removed {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to remove {}", dir.display())),
    }
}
