//! Asset categories handled by the pipeline.

use std::fmt;

use crate::config::{CategoryPaths, Paths};
use std::path::Path;

/// One asset category with its own transformer per build mode.
///
/// Each category reads from a disjoint source root and writes to a disjoint
/// destination subtree, so categories can run concurrently without
/// coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Html,
    Styles,
    Scripts,
    Images,
    Fonts,
    ThirdParty,
}

impl Category {
    /// All categories, in the order the parallel group spawns them.
    pub const ALL: [Category; 6] = [
        Category::Styles,
        Category::Scripts,
        Category::Images,
        Category::Fonts,
        Category::ThirdParty,
        Category::Html,
    ];

    /// Short label used in log prefixes and reload reasons.
    pub fn label(self) -> &'static str {
        match self {
            Category::Html => "html",
            Category::Styles => "styles",
            Category::Scripts => "scripts",
            Category::Images => "images",
            Category::Fonts => "fonts",
            Category::ThirdParty => "third-party",
        }
    }

    /// Source root for this category.
    pub fn src_dir(self, paths: &Paths) -> &Path {
        self.dir_in(&paths.src)
    }

    /// Destination root for this category within an output target.
    pub fn dest_dir(self, target: &CategoryPaths) -> &Path {
        self.dir_in(target)
    }

    fn dir_in(self, paths: &CategoryPaths) -> &Path {
        match self {
            Category::Html => &paths.base,
            Category::Styles => &paths.css,
            Category::Scripts => &paths.js,
            Category::Images => &paths.images,
            Category::Fonts => &paths.fonts,
            Category::ThirdParty => &paths.third_party,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Paths;

    #[test]
    fn test_all_covers_every_category() {
        assert_eq!(Category::ALL.len(), 6);
        for pair in Category::ALL.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_category_dirs_are_disjoint() {
        let paths = Paths::default();
        let dirs: Vec<_> = Category::ALL
            .iter()
            .map(|c| c.dest_dir(&paths.dist))
            .collect();
        for (i, a) in dirs.iter().enumerate() {
            for b in dirs.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
