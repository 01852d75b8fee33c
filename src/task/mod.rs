//! Per-category transformers.
//!
//! Each transformer reads every matching file under one source category root
//! and writes transformed output to the category's destination. Transformers
//! own no state and write to disjoint destination subtrees, so the
//! orchestrator can run them concurrently without coordination.
//!
//! Failure policy: a transform error for one file is logged and the file's
//! output skipped; sibling files and sibling transformers proceed. Hard I/O
//! errors abort only the owning category task.

pub mod html;
pub mod images;
pub mod minify;
pub mod scripts;
pub mod statics;
pub mod styles;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{ImageQuality, PipelineConfig};
use crate::core::{Category, Mode};

/// Run one category's transformer for the given mode.
pub fn run(
    category: Category,
    config: &PipelineConfig,
    mode: Mode,
    quality: ImageQuality,
) -> Result<()> {
    match category {
        Category::Html => html::run(config, mode),
        Category::Styles => styles::run(config, mode),
        Category::Scripts => scripts::run(config, mode),
        Category::Images => images::run(config, mode, quality),
        Category::Fonts | Category::ThirdParty => statics::run(category, config, mode),
    }
}

// ============================================================================
// Shared filesystem helpers
// ============================================================================

/// Collect all files under `root` matching `keep`, sorted for deterministic
/// processing order. A missing root yields no files.
pub(crate) fn collect_files(root: &Path, keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }
    // Serial walk: callers run inside a rayon scope, and jwalk's default
    // rayon-pool parallelism times out there and silently yields no entries.
    let mut files: Vec<PathBuf> = jwalk::WalkDir::new(root)
        .parallelism(jwalk::Parallelism::Serial)
        .skip_hidden(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| keep(path))
        .collect();
    files.sort();
    files
}

/// Case-insensitive extension check.
pub(crate) fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| exts.iter().any(|want| ext.eq_ignore_ascii_case(want)))
}

/// Destination path for `path`, preserving its structure relative to `src_root`.
pub(crate) fn dest_for(path: &Path, src_root: &Path, dest_root: &Path) -> Result<PathBuf> {
    let rel = path
        .strip_prefix(src_root)
        .with_context(|| format!("'{}' is not under '{}'", path.display(), src_root.display()))?;
    Ok(dest_root.join(rel))
}

/// Write `bytes` to `dest`, creating parent directories as needed.
pub(crate) fn write_file(dest: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, bytes).with_context(|| format!("failed to write {}", dest.display()))
}

/// Copy a single file to `dest`, creating parent directories as needed.
pub(crate) fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dest)
        .with_context(|| format!("failed to copy {} to {}", src.display(), dest.display()))?;
    Ok(())
}

/// Recursively copy a directory tree verbatim.
///
/// A missing source directory is a no-op. Returns the number of files copied.
pub(crate) fn copy_tree(src_dir: &Path, dest_dir: &Path) -> Result<usize> {
    if !src_dir.is_dir() {
        return Ok(0);
    }
    let mut count = 0;
    copy_tree_recursive(src_dir, dest_dir, &mut count)?;
    Ok(count)
}

fn copy_tree_recursive(src_dir: &Path, dest_dir: &Path, count: &mut usize) -> Result<()> {
    for entry in fs::read_dir(src_dir)? {
        let entry = entry?;
        let src_path = entry.path();
        let dest_path = dest_dir.join(entry.file_name());

        if src_path.is_dir() {
            copy_tree_recursive(&src_path, &dest_path, count)?;
        } else {
            copy_file(&src_path, &dest_path)?;
            *count += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_missing_root() {
        let files = collect_files(Path::new("/nonexistent/sitekit"), |_| true);
        assert!(files.is_empty());
    }

    #[test]
    fn test_collect_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.scss"), "").unwrap();
        fs::write(dir.path().join("a.scss"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("sub/c.scss"), "").unwrap();

        let files = collect_files(dir.path(), |p| has_extension(p, &["scss"]));
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.scss"),
                PathBuf::from("b.scss"),
                PathBuf::from("sub/c.scss")
            ]
        );
    }

    #[test]
    fn test_has_extension_case_insensitive() {
        assert!(has_extension(Path::new("photo.JPG"), &["jpg", "jpeg"]));
        assert!(!has_extension(Path::new("photo"), &["jpg"]));
    }

    #[test]
    fn test_copy_tree_nested() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("fonts");
        fs::create_dir_all(src.join("serif")).unwrap();
        fs::write(src.join("sans.woff2"), "aa").unwrap();
        fs::write(src.join("serif/book.woff2"), "bb").unwrap();

        let dest = dir.path().join("out/fonts");
        let count = copy_tree(&src, &dest).unwrap();

        assert_eq!(count, 2);
        assert!(dest.join("sans.woff2").is_file());
        assert!(dest.join("serif/book.woff2").is_file());
    }

    #[test]
    fn test_copy_tree_missing_source() {
        let dir = TempDir::new().unwrap();
        let count = copy_tree(&dir.path().join("absent"), &dir.path().join("out")).unwrap();
        assert_eq!(count, 0);
    }
}
