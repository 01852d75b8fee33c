//! Scripts transformer: copy with optional production minification.
//!
//! Vendor code under `libs/` is written before the site's own scripts,
//! mirroring the load order pages expect. Relative paths are preserved.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::PipelineConfig;
use crate::core::Mode;
use crate::{debug, log};

use super::{collect_files, copy_file, dest_for, has_extension, minify::minify_js, write_file};

pub fn run(config: &PipelineConfig, mode: Mode) -> Result<()> {
    let src_root = &config.paths.src.js;
    let dest_root = &mode.target(&config.paths).js;

    let files = collect_files(src_root, |p| has_extension(p, &["js"]));
    let (libs, own): (Vec<PathBuf>, Vec<PathBuf>) = files
        .into_iter()
        .partition(|p| is_under_libs(p, src_root));

    let mut written = 0usize;
    for file in libs.iter().chain(own.iter()) {
        let dest = dest_for(file, src_root, dest_root)?;
        let rel = file.strip_prefix(src_root).unwrap_or(file);

        if mode.is_prod() && !is_preminified(file) {
            // Per-file failures (unreadable source, parse errors) are
            // log-and-skip, same as the other transformers
            let source = match fs::read_to_string(file) {
                Ok(source) => source,
                Err(e) => {
                    log!("scripts"; "failed to read {}: {e}, skipping", rel.display());
                    continue;
                }
            };
            match minify_js(&source) {
                Ok(code) => write_file(&dest, code.as_bytes())?,
                Err(e) => {
                    log!("scripts"; "failed to minify {}: {e}, skipping", rel.display());
                    continue;
                }
            }
        } else {
            copy_file(file, &dest)?;
        }
        written += 1;
    }

    debug!("scripts"; "{written} script(s) written ({})", mode.label());
    Ok(())
}

fn is_under_libs(path: &Path, src_root: &Path) -> bool {
    path.strip_prefix(src_root)
        .map(|rel| rel.starts_with("libs"))
        .unwrap_or(false)
}

/// Already-minified bundles pass through untouched.
fn is_preminified(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(".min"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.paths.src.js = root.join("src/js");
        config.paths.dist.js = root.join("dist/js");
        config.paths.build.js = root.join("build/js");
        config
    }

    fn write_sources(config: &PipelineConfig) {
        let js = &config.paths.src.js;
        fs::create_dir_all(js.join("libs")).unwrap();
        fs::write(js.join("libs/vendor.js"), "window.vendor = { loaded: true };\n").unwrap();
        fs::write(
            js.join("app.js"),
            "function greet(name) {\n  return 'hello ' + name;\n}\nconsole.log(greet('world'));\n",
        )
        .unwrap();
    }

    #[test]
    fn test_dev_copies_verbatim() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        write_sources(&config);

        run(&config, Mode::Development).unwrap();

        let out = &config.paths.dist.js;
        let app = fs::read_to_string(out.join("app.js")).unwrap();
        assert!(app.contains("function greet(name)"));
        assert!(out.join("libs/vendor.js").is_file());
    }

    #[test]
    fn test_prod_minifies() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        write_sources(&config);

        run(&config, Mode::Production).unwrap();

        let out = &config.paths.build.js;
        let app = fs::read_to_string(out.join("app.js")).unwrap();
        assert!(!app.contains("function greet(name)"));
        assert!(app.len() < fs::metadata(config.paths.src.js.join("app.js")).unwrap().len() as usize);
    }

    #[test]
    fn test_prod_unparseable_skipped_siblings_survive() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let js = &config.paths.src.js;
        fs::create_dir_all(js).unwrap();
        fs::write(js.join("bad.js"), "function (((\n").unwrap();
        fs::write(js.join("ok.js"), "console.log(1);\n").unwrap();

        run(&config, Mode::Production).unwrap();

        assert!(!config.paths.build.js.join("bad.js").exists());
        assert!(config.paths.build.js.join("ok.js").is_file());
    }

    #[test]
    fn test_prod_unreadable_source_skipped() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let js = &config.paths.src.js;
        fs::create_dir_all(js).unwrap();
        // Invalid UTF-8 makes read_to_string fail
        fs::write(js.join("binary.js"), [0xff, 0xfe, 0x00, 0x01]).unwrap();
        fs::write(js.join("ok.js"), "console.log(1);\n").unwrap();

        run(&config, Mode::Production).unwrap();

        assert!(!config.paths.build.js.join("binary.js").exists());
        assert!(config.paths.build.js.join("ok.js").is_file());
    }

    #[test]
    fn test_preminified_passthrough() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let js = &config.paths.src.js;
        fs::create_dir_all(js).unwrap();
        let bundle = "/* keep this banner */var x=1;\n";
        fs::write(js.join("jquery.min.js"), bundle).unwrap();

        run(&config, Mode::Production).unwrap();

        let out = fs::read_to_string(config.paths.build.js.join("jquery.min.js")).unwrap();
        assert_eq!(out, bundle);
    }

    #[test]
    fn test_is_preminified() {
        assert!(is_preminified(Path::new("js/app.min.js")));
        assert!(!is_preminified(Path::new("js/app.js")));
    }
}
