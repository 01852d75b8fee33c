//! Workflow orchestration.
//!
//! Both workflows follow the same shape: clean the output target, then run
//! every category transformer concurrently. Development continues into the
//! long-running preview server and watcher; production logs completion and
//! returns.

mod clean;

use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;

use crate::config::{ImageQuality, PipelineConfig};
use crate::core::{Category, Mode};
use crate::reload::{self, ReloadHub};
use crate::{log, serve, task, watch};

/// Development workflow: clean, transform, serve, watch. Blocks until
/// Ctrl+C unblocks the server.
pub fn dev(config: &PipelineConfig, watch_enabled: bool) -> Result<()> {
    let quality = config.tools.image_quality();

    clean::clean_target(&config.paths.dist.base)?;
    build(config, Mode::Development, quality);

    let serve_root = config.paths.dist.base.clone();
    if watch_enabled {
        let hub = ReloadHub::start(reload::DEFAULT_WS_PORT)?;
        let server = serve::bind(config.tools.port, Some(hub.port()))?;
        let watcher = watch::spawn(config.clone(), hub)?;
        server.run(serve_root)?;
        wait_for_thread(watcher);
    } else {
        let server = serve::bind(config.tools.port, None)?;
        server.run(serve_root)?;
    }

    Ok(())
}

/// Production workflow: clean, transform with minification, report.
///
/// A hard category failure (I/O, permissions) fails the whole run with a
/// nonzero exit so CI can tell it apart from a clean build. Per-file
/// compile errors inside a category are still soft.
pub fn prod(config: &PipelineConfig) -> Result<()> {
    let quality = config.tools.image_quality();

    clean::clean_target(&config.paths.build.base)?;
    let failed = build(config, Mode::Production, quality);
    if failed > 0 {
        anyhow::bail!("production build failed: {failed} category task(s) reported errors");
    }

    log!("build"; "production build complete, files are located at {}", config.paths.build.base.display());
    Ok(())
}

/// Run every category transformer concurrently for one mode.
///
/// Category failures are collected and reported, not propagated: one broken
/// category must not take down the others or the workflow. Returns the
/// number of failed categories.
fn build(config: &PipelineConfig, mode: Mode, quality: ImageQuality) -> usize {
    let failures: Mutex<Vec<(Category, anyhow::Error)>> = Mutex::new(Vec::new());

    rayon::scope(|scope| {
        for &category in &Category::ALL {
            let failures = &failures;
            scope.spawn(move |_| {
                if let Err(e) = task::run(category, config, mode, quality) {
                    failures.lock().push((category, e));
                }
            });
        }
    });

    let failures = failures.into_inner();
    for (category, e) in &failures {
        log!("error"; "{category} task failed: {e:#}");
    }
    failures.len()
}

/// Give a worker thread a moment to finish after shutdown (max 2 seconds).
fn wait_for_thread(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn site_config(root: &Path) -> PipelineConfig {
        let toml = format!(
            r#"
            [paths.src]
            base = "{r}/src"
            css = "{r}/src/css"
            js = "{r}/src/js"
            images = "{r}/src/img"
            fonts = "{r}/src/fonts"
            thirdParty = "{r}/src/third-party"

            [paths.dist]
            base = "{r}/dist"
            css = "{r}/dist/css"
            js = "{r}/dist/js"
            images = "{r}/dist/img"
            fonts = "{r}/dist/fonts"
            thirdParty = "{r}/dist/third-party"

            [paths.build]
            base = "{r}/build"
            css = "{r}/build/css"
            js = "{r}/build/js"
            images = "{r}/build/img"
            fonts = "{r}/build/fonts"
            thirdParty = "{r}/build/third-party"
            "#,
            r = root.display()
        );
        let config = PipelineConfig::from_str(&toml).unwrap();
        config.paths.validate().unwrap();
        config
    }

    fn scaffold_site(config: &PipelineConfig) {
        fs::create_dir_all(&config.paths.src.css).unwrap();
        fs::create_dir_all(&config.paths.src.js).unwrap();
        fs::create_dir_all(&config.paths.src.fonts).unwrap();
        fs::write(
            config.paths.src.base.join("index.html"),
            "<html><body><p>home</p></body></html>\n",
        )
        .unwrap();
        fs::write(config.paths.src.css.join("main.scss"), "body { margin: 0; }\n").unwrap();
        fs::write(config.paths.src.js.join("app.js"), "console.log('hi');\n").unwrap();
        fs::write(config.paths.src.fonts.join("body.woff2"), "ff").unwrap();
    }

    #[test]
    fn test_dev_build_outputs() {
        let dir = TempDir::new().unwrap();
        let config = site_config(dir.path());
        scaffold_site(&config);

        let failed = build(&config, Mode::Development, ImageQuality::default());
        assert_eq!(failed, 0);

        let dist = &config.paths.dist;
        assert!(dist.base.join("index.html").is_file());
        assert!(dist.css.join("style.css").is_file());
        assert!(dist.js.join("app.js").is_file());
        assert!(dist.fonts.join("body.woff2").is_file());
    }

    #[test]
    fn test_prod_build_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let config = site_config(dir.path());
        scaffold_site(&config);

        prod(&config).unwrap();
        let first = fs::read_to_string(config.paths.build.css.join("main.css")).unwrap();

        // Stale output from the first run must not leak into the second
        prod(&config).unwrap();
        let second = fs::read_to_string(config.paths.build.css.join("main.css")).unwrap();

        assert_eq!(first, second);
        assert!(config.paths.build.base.join("index.html").is_file());
        assert!(!config.paths.build.css.join("style.css").exists());
    }

    #[test]
    fn test_prod_fails_on_hard_category_error() {
        let dir = TempDir::new().unwrap();
        let config = site_config(dir.path());
        fs::create_dir_all(&config.paths.src.base).unwrap();
        // Invalid UTF-8 page: the html task's read aborts that category
        fs::write(config.paths.src.base.join("index.html"), [0xff, 0xfe, 0x01]).unwrap();

        assert!(prod(&config).is_err());
    }

    #[test]
    fn test_missing_category_roots_tolerated() {
        let dir = TempDir::new().unwrap();
        let config = site_config(dir.path());
        fs::create_dir_all(&config.paths.src.base).unwrap();
        fs::write(config.paths.src.base.join("index.html"), "<p>solo</p>").unwrap();

        let failed = build(&config, Mode::Production, ImageQuality::default());
        assert_eq!(failed, 0);
        assert!(config.paths.build.base.join("index.html").is_file());
    }
}
