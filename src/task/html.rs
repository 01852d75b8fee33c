//! HTML transformer: partial includes and readability cleanup.
//!
//! Pages may reference shared fragments with `@@include('partials/nav.html')`
//! directives; includes resolve relative to the including file and may nest.
//! Production walks the whole source tree while development only processes
//! top-level pages, matching how partials are typically kept out of the
//! served root during development.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};

use crate::config::PipelineConfig;
use crate::core::Mode;
use crate::{debug, log};

use super::{collect_files, dest_for, has_extension, write_file};

/// Maximum depth of nested `@@include` resolution (cycle guard).
const MAX_INCLUDE_DEPTH: usize = 8;

static INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"@@include\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());

pub fn run(config: &PipelineConfig, mode: Mode) -> Result<()> {
    let src_root = &config.paths.src.base;
    let dest_root = &mode.target(&config.paths).base;

    let pages = if mode.is_prod() {
        collect_files(src_root, |p| has_extension(p, &["html", "php"]))
    } else {
        top_level_pages(src_root)
    };

    for page in &pages {
        let raw = fs::read_to_string(page)
            .with_context(|| format!("failed to read {}", page.display()))?;
        let dir = page.parent().unwrap_or(src_root);
        let expanded = resolve_includes(&raw, dir, 0);
        let dest = dest_for(page, src_root, dest_root)?;
        write_file(&dest, tidy(&expanded).as_bytes())?;
    }

    debug!("html"; "{} page(s) written ({})", pages.len(), mode.label());
    Ok(())
}

/// Top-level `.html`/`.php` files only (development scope).
fn top_level_pages(src_root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(src_root) else {
        return Vec::new();
    };
    let mut pages: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_extension(p, &["html", "php"]))
        .collect();
    pages.sort();
    pages
}

/// Expand `@@include` directives, resolving paths relative to `dir`.
///
/// A missing partial is logged and the directive left in place so the page
/// still renders; the depth limit breaks include cycles.
fn resolve_includes(content: &str, dir: &Path, depth: usize) -> String {
    if depth >= MAX_INCLUDE_DEPTH {
        log!("html"; "include depth limit reached under {}", dir.display());
        return content.to_string();
    }

    INCLUDE
        .replace_all(content, |caps: &Captures| {
            let partial = dir.join(&caps[1]);
            match fs::read_to_string(&partial) {
                Ok(text) => {
                    let partial_dir = partial.parent().unwrap_or(dir);
                    resolve_includes(&text, partial_dir, depth + 1)
                }
                Err(e) => {
                    log!("html"; "missing partial '{}': {}", partial.display(), e);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Reformat for readability: LF line endings, no trailing whitespace,
/// blank-line runs collapsed to one.
fn tidy(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut blank_run = 0;
    for line in content.replace("\r\n", "\n").lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
