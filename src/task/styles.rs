//! Styles transformer: SASS compilation, vendor prefixing, minification.
//!
//! Development concatenates every compiled stylesheet into a single
//! `style.css`; production writes one minified file per source stylesheet.
//! A stylesheet that fails to compile is reported and skipped - siblings
//! still produce output.

use std::fs;
use std::path::Path;

use anyhow::{Result, anyhow};

use crate::config::PipelineConfig;
use crate::core::Mode;
use crate::{debug, log};

use super::{collect_files, minify::process_css, write_file};

/// Name of the concatenated development stylesheet.
pub const DEV_BUNDLE: &str = "style.css";

pub fn run(config: &PipelineConfig, mode: Mode) -> Result<()> {
    let src_root = &config.paths.src.css;
    let dest_root = &mode.target(&config.paths).css;

    let sheets = collect_files(src_root, is_stylesheet);
    if sheets.is_empty() {
        return Ok(());
    }

    let mut bundle = String::new();
    let mut compiled = 0usize;

    for sheet in &sheets {
        let rel = sheet.strip_prefix(src_root).unwrap_or(sheet);
        let css = match compile(sheet) {
            Ok(css) => css,
            Err(e) => {
                // Report and move on; one broken sheet must not stall the rest
                log!("styles"; "failed to compile {}:\n{e}", rel.display());
                continue;
            }
        };

        let processed = match process_css(&css, &rel.display().to_string(), mode.is_prod()) {
            Ok(processed) => processed,
            Err(e) => {
                log!("styles"; "failed to post-process {}: {e}", rel.display());
                continue;
            }
        };

        compiled += 1;
        if mode.is_prod() {
            let dest = dest_root.join(rel.with_extension("css"));
            write_file(&dest, processed.as_bytes())?;
        } else {
            bundle.push_str(&processed);
            if !processed.ends_with('\n') {
                bundle.push('\n');
            }
        }
    }

    if !mode.is_prod() && compiled > 0 {
        write_file(&dest_root.join(DEV_BUNDLE), bundle.as_bytes())?;
    }

    debug!("styles"; "{compiled}/{} stylesheet(s) compiled ({})", sheets.len(), mode.label());
    Ok(())
}

/// Non-partial SASS sources. Partials (leading underscore) are only ever
/// pulled in via `@use`/`@import`.
fn is_stylesheet(path: &Path) -> bool {
    let is_sass = super::has_extension(path, &["scss", "sass"]);
    let is_partial = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'));
    is_sass && !is_partial
}

fn compile(path: &Path) -> Result<String> {
    grass::from_path(path, &grass::Options::default()).map_err(|e| anyhow!("{e}"))
}
