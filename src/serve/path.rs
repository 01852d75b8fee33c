//! URL to filesystem path resolution.
//!
//! The served tree is the pipeline's own output, so resolution is a lexical
//! walk: the decoded URL is split into components and joined under the serve
//! root one segment at a time, refusing any segment that could climb out of
//! it. Directories resolve to their `index.html`.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Resolve a request URL to a file under `serve_root`, or `None` when the
/// URL is malformed, escapes the root, or matches nothing on disk.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let decoded = decode_url(url)?;

    let mut local = serve_root.to_path_buf();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            _ if segment.contains(['\\', '\0']) => return None,
            _ => local.push(segment),
        }
    }

    if local.is_file() {
        return Some(local);
    }

    // A bare directory URL serves its index page
    let index = local.join("index.html");
    index.is_file().then_some(index)
}

/// Percent-decode the URL and drop the query/fragment suffix.
fn decode_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    percent_decode_str(path)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}
