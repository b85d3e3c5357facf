//! trikey-search: find files or directories by name under a root directory
//!
//! The walk is best-effort: entries that cannot be read (permission denied,
//! removed mid-walk, ...) are skipped and logged at debug level instead of
//! aborting the search. Directory symlinks are reported when they match but
//! never descended into.

use serde::Serialize;
use std::path::Path;

use trikey_core::types::SearchHit;
use trikey_core::{SearchKind, TrikeyError, TrikeyResult};

/// Outcome of a [`search`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchReport {
    /// Matches in walk order
    pub hits: Vec<SearchHit>,
    /// Entries examined (matching or not)
    pub scanned: u64,
}

/// Recursively search `root` for entries of `kind` whose file name contains `needle`.
///
/// Matching is case-sensitive and an empty `needle` matches every entry of
/// the requested kind. `root` itself is never reported.
pub fn search(root: &Path, kind: SearchKind, needle: &str) -> TrikeyResult<SearchReport> {
    if !root.is_dir() {
        return Err(TrikeyError::FileNotFound(root.to_path_buf()));
    }

    let mut report = SearchReport::default();
    walk(root, kind, needle, &mut report);

    tracing::info!(
        root = %root.display(),
        kind = ?kind,
        needle,
        scanned = report.scanned,
        hits = report.hits.len(),
        "search finished"
    );
    Ok(report)
}

fn walk(dir: &Path, kind: SearchKind, needle: &str, report: &mut SearchReport) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(path = %dir.display(), error = %e, "skipping unreadable directory");
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(path = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        report.scanned += 1;

        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        let matches_kind = match kind {
            SearchKind::File => path.is_file(),
            SearchKind::Directory => path.is_dir(),
        };
        if matches_kind && name.contains(needle) {
            report.hits.push(SearchHit {
                name,
                path: path.clone(),
            });
        }

        // file_type() does not follow symlinks, so linked directories are not entered
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => walk(&path, kind, needle, report),
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping entry without file type");
            }
        }
    }
}
