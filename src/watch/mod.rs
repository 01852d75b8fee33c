//! File watcher driving incremental development rebuilds.
//!
//! One watcher thread owns the whole pipeline: notify events are coalesced
//! per asset category by the debouncer, then each pending category's
//! development transformer runs inline on this thread. Rebuilds are thereby
//! serialized - events arriving mid-rebuild queue up for the next batch -
//! and each batch ends with a single reload broadcast.

mod debouncer;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam::channel;
use notify::{EventKind, RecursiveMode, Watcher};

use crate::config::{ImageQuality, Paths, PipelineConfig};
use crate::core::{self, Category};
use crate::reload::ReloadHub;
use crate::{debug, log, logger, task};

use debouncer::Debouncer;

/// Start the watcher thread.
///
/// The watcher attaches before the caller enters the server loop, so events
/// raised during startup are buffered rather than lost.
pub fn spawn(config: PipelineConfig, hub: ReloadHub) -> Result<JoinHandle<()>> {
    let (tx, rx) = channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("failed to create file watcher")?;

    for root in watch_roots(&config.paths) {
        if !root.is_dir() {
            debug!("watch"; "skipping missing root {}", root.display());
            continue;
        }
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch {}", root.display()))?;
        debug!("watch"; "watching {}", root.display());
    }

    log!("watch"; "watching for changes...");

    let handle = thread::Builder::new()
        .name("watch".into())
        .spawn(move || {
            // The watcher must stay alive for events to keep flowing
            let _watcher = watcher;
            run_loop(&rx, &config, &hub);
        })
        .context("failed to spawn watch thread")?;

    Ok(handle)
}

/// Deduplicated watch roots: a category root nested under another configured
/// root is already covered by the recursive watch on its ancestor.
fn watch_roots(paths: &Paths) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Category::ALL
        .iter()
        .map(|c| absolutize(c.src_dir(paths)))
        .collect();
    candidates.sort_by_key(|p| p.components().count());

    let mut roots: Vec<PathBuf> = Vec::new();
    for candidate in candidates {
        if !roots.iter().any(|kept| candidate.starts_with(kept)) {
            roots.push(candidate);
        }
    }
    roots
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

// ============================================================================
// Event classification
// ============================================================================

/// Maps changed paths to the asset category whose transformer must re-run.
struct Classifier {
    /// Category roots, absolutized for prefix matching.
    roots: Vec<(Category, PathBuf)>,
}

impl Classifier {
    fn new(paths: &Paths) -> Self {
        let roots = Category::ALL
            .iter()
            .map(|&c| (c, absolutize(c.src_dir(paths))))
            .collect();
        Self { roots }
    }

    /// Category for a changed file, or `None` when no transformer cares.
    ///
    /// The most specific (deepest) matching root wins, so a stylesheet under
    /// `src/css/` classifies as styles even though `src/` is the html root.
    fn classify(&self, path: &Path) -> Option<Category> {
        let path = absolutize(path);
        let (category, _) = self
            .roots
            .iter()
            .filter(|(_, root)| path.starts_with(root))
            .max_by_key(|(_, root)| root.components().count())?;

        match category {
            Category::Styles => task::has_extension(&path, &["scss", "sass"]).then_some(*category),
            Category::Scripts => task::has_extension(&path, &["js"]).then_some(*category),
            Category::Html => task::has_extension(&path, &["html", "php"]).then_some(*category),
            Category::Images | Category::Fonts | Category::ThirdParty => Some(*category),
        }
    }
}

/// Editor temp/backup artifacts that must never trigger a rebuild.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

// ============================================================================
// Event loop
// ============================================================================

fn run_loop(
    rx: &channel::Receiver<notify::Result<notify::Event>>,
    config: &PipelineConfig,
    hub: &ReloadHub,
) {
    let shutdown = core::shutdown_signal();
    let classifier = Classifier::new(&config.paths);
    let quality = config.tools.image_quality();
    let mut debouncer = Debouncer::new();

    loop {
        channel::select! {
            recv(rx) -> msg => match msg {
                Ok(Ok(event)) => intake(&event, &classifier, &mut debouncer),
                Ok(Err(e)) => log!("watch"; "notify error: {e}"),
                Err(_) => break,
            },
            recv(shutdown) -> _ => break,
            default(debouncer.sleep_duration()) => {
                if let Some(batch) = debouncer.take_if_ready() {
                    rebuild(&batch, config, quality, hub);
                }
            }
        }
        if core::is_shutdown() {
            break;
        }
    }
    debug!("watch"; "watcher stopped");
}

fn intake(event: &notify::Event, classifier: &Classifier, debouncer: &mut Debouncer) {
    match event.kind {
        EventKind::Create(_) | EventKind::Remove(_) => {}
        EventKind::Modify(modify) => {
            // Metadata-only noise (mtime/chmod) would cause rebuild loops
            if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                return;
            }
        }
        _ => return,
    }

    for path in &event.paths {
        if is_temp_file(path) {
            continue;
        }
        if let Some(category) = classifier.classify(path) {
            debug!("watch"; "{category}: {}", path.display());
            debouncer.note(category);
        }
    }
}

/// Re-run the development transformer for every pending category, then
/// signal connected pages once for the whole batch.
fn rebuild(
    batch: &BTreeSet<Category>,
    config: &PipelineConfig,
    quality: ImageQuality,
    hub: &ReloadHub,
) {
    let labels: Vec<&str> = batch.iter().map(|c| c.label()).collect();
    let summary = labels.join(", ");

    let mut succeeded = 0usize;
    for &category in batch {
        match task::run(category, config, core::Mode::Development, quality) {
            Ok(()) => succeeded += 1,
            Err(e) => {
                logger::status_error(&format!("rebuild failed: {category}"), &format!("{e:#}"));
            }
        }
    }

    if succeeded == batch.len() {
        logger::status_success(&format!("rebuilt {summary}"));
    }
    if succeeded > 0 {
        hub.reload(&summary);
    }
}
