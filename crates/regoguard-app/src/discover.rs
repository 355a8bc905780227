use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

const REGO_EXTENSION: &str = "rego";

/// Discover policy sources under `root`.
///
/// Behavior:
/// - A file root is returned as-is, whatever its extension.
/// - A directory root is walked recursively for `*.rego` files; hidden entries are skipped.
/// - Output is sorted so reports are stable across platforms.
pub fn discover_sources(root: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let meta = std::fs::metadata(root).with_context(|| format!("stat {root}"))?;
    if meta.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut out = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(path) = pathbuf_to_utf8(entry.into_path()) else {
            tracing::warn!("skipping non-UTF-8 path");
            continue;
        };
        if path.extension() == Some(REGO_EXTENSION) {
            out.push(path);
        }
    }

    out.sort();
    tracing::debug!(root = %root, sources = out.len(), "discovered policy sources");
    Ok(out)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|n| n.starts_with('.'))
}

fn pathbuf_to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).ok()
}
