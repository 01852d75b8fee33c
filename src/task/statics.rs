//! Static categories: fonts and bundled third-party assets.
//!
//! Both are verbatim tree copies in every mode.

use anyhow::Result;

use crate::config::PipelineConfig;
use crate::core::{Category, Mode};
use crate::debug;

use super::copy_tree;

pub fn run(category: Category, config: &PipelineConfig, mode: Mode) -> Result<()> {
    let src = category.src_dir(&config.paths);
    let dest = category.dest_dir(mode.target(&config.paths));

    let copied = copy_tree(src, dest)?;
    debug!(category.label(); "{copied} file(s) copied ({})", mode.label());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.paths.src.fonts = root.join("src/fonts");
        config.paths.src.third_party = root.join("src/third-party");
        config.paths.dist.fonts = root.join("dist/fonts");
        config.paths.dist.third_party = root.join("dist/third-party");
        config.paths.build.fonts = root.join("build/fonts");
        config.paths.build.third_party = root.join("build/third-party");
        config
    }

    #[test]
    fn test_fonts_copied_in_both_modes() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.paths.src.fonts).unwrap();
        fs::write(config.paths.src.fonts.join("body.woff2"), "ff").unwrap();

        run(Category::Fonts, &config, Mode::Development).unwrap();
        run(Category::Fonts, &config, Mode::Production).unwrap();

        assert!(config.paths.dist.fonts.join("body.woff2").is_file());
        assert!(config.paths.build.fonts.join("body.woff2").is_file());
    }

    #[test]
    fn test_third_party_tree_preserved() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let src = &config.paths.src.third_party;
        fs::create_dir_all(src.join("slider/css")).unwrap();
        fs::write(src.join("slider/slider.js"), "x").unwrap();
        fs::write(src.join("slider/css/slider.css"), "y").unwrap();

        run(Category::ThirdParty, &config, Mode::Development).unwrap();

        let out = &config.paths.dist.third_party;
        assert!(out.join("slider/slider.js").is_file());
        assert!(out.join("slider/css/slider.css").is_file());
    }

    #[test]
    fn test_missing_source_is_noop() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        run(Category::Fonts, &config, Mode::Development).unwrap();
        assert!(!config.paths.dist.fonts.exists());
    }
}
