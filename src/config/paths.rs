//! `[paths]` section: source and output directory layout.
//!
//! One record type (`CategoryPaths`) is shared by the source tree and both
//! output targets, so every category present in `src` structurally has a
//! matching entry in `dist` and `build`.
//!
//! # Example
//!
//! ```toml
//! [paths.src]
//! base = "src"
//! css = "src/scss"
//! js = "src/js"
//! images = "src/img"
//! fonts = "src/fonts"
//! thirdParty = "src/vendor"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Directory layout for the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Source tree.
    pub src: CategoryPaths,
    /// Development output target.
    #[serde(default = "CategoryPaths::dist_default")]
    pub dist: CategoryPaths,
    /// Production output target.
    #[serde(default = "CategoryPaths::build_default")]
    pub build: CategoryPaths,
}

/// Per-category directories under one root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryPaths {
    pub base: PathBuf,
    pub css: PathBuf,
    pub js: PathBuf,
    pub images: PathBuf,
    pub fonts: PathBuf,
    pub third_party: PathBuf,
}

impl CategoryPaths {
    /// Standard layout rooted at `root`: css/, js/, img/, fonts/, third-party/.
    fn rooted(root: &str) -> Self {
        let base = PathBuf::from(root);
        Self {
            css: base.join("css"),
            js: base.join("js"),
            images: base.join("img"),
            fonts: base.join("fonts"),
            third_party: base.join("third-party"),
            base,
        }
    }

    fn dist_default() -> Self {
        Self::rooted("dist")
    }

    fn build_default() -> Self {
        Self::rooted("build")
    }

    /// Category sub-directories, paired with a name for diagnostics.
    fn entries(&self) -> [(&'static str, &Path); 5] {
        [
            ("css", &self.css),
            ("js", &self.js),
            ("images", &self.images),
            ("fonts", &self.fonts),
            ("thirdParty", &self.third_party),
        ]
    }
}

impl Default for CategoryPaths {
    fn default() -> Self {
        Self::rooted("src")
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            src: CategoryPaths::rooted("src"),
            dist: CategoryPaths::dist_default(),
            build: CategoryPaths::build_default(),
        }
    }
}

impl Paths {
    /// Sanity-check the layout before any task runs.
    ///
    /// Output roots must be distinct from the source base and must not nest
    /// with it: cleaning an output root must never delete sources, and
    /// transformers must never write into the tree the watcher observes.
    /// Each output category directory must live under its target's base,
    /// otherwise a partially-specified target table would silently mix
    /// source and output paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, target) in [("dist", &self.dist), ("build", &self.build)] {
            if target.base == self.src.base
                || target.base.starts_with(&self.src.base)
                || self.src.base.starts_with(&target.base)
            {
                return Err(ConfigError::InvalidPaths(format!(
                    "{name} base '{}' overlaps the source base '{}'",
                    target.base.display(),
                    self.src.base.display()
                )));
            }
            for (category, dir) in target.entries() {
                if !dir.starts_with(&target.base) {
                    return Err(ConfigError::InvalidPaths(format!(
                        "{name}.{category} '{}' is not under the {name} base '{}'",
                        dir.display(),
                        target.base.display()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let paths = Paths::default();
        assert_eq!(paths.src.base, PathBuf::from("src"));
        assert_eq!(paths.src.css, PathBuf::from("src/css"));
        assert_eq!(paths.dist.base, PathBuf::from("dist"));
        assert_eq!(paths.dist.third_party, PathBuf::from("dist/third-party"));
        assert_eq!(paths.build.images, PathBuf::from("build/img"));
    }

    #[test]
    fn test_default_layout_validates() {
        assert!(Paths::default().validate().is_ok());
    }

    #[test]
    fn test_camel_case_third_party() {
        let paths: Paths = toml::from_str(
            "[src]\nbase = \"web\"\nthirdParty = \"web/vendor\"",
        )
        .unwrap();
        assert_eq!(paths.src.base, PathBuf::from("web"));
        assert_eq!(paths.src.third_party, PathBuf::from("web/vendor"));
    }

    #[test]
    fn test_output_overlapping_source_rejected() {
        let mut paths = Paths::default();
        paths.dist.base = PathBuf::from("src/dist");
        assert!(paths.validate().is_err());
    }

    #[test]
    fn test_partial_target_table_rejected() {
        // Only `base` overridden: sub-dirs still point at the source layout
        let paths: Paths = toml::from_str("[dist]\nbase = \"out\"").unwrap();
        assert!(paths.validate().is_err());
    }
}
