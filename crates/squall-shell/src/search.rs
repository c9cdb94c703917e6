//! Recursive filesystem search.

use std::fs;
use std::path::{Path, PathBuf};

/// Count the directories a search starting at `root` will enter,
/// including `root` itself.
///
/// This sizes the progress total for [`find_files`], which fires its
/// callback once per directory entered. Unreadable directories still
/// count; only their children are skipped, on both sides.
pub fn count_dirs(root: &Path) -> u64 {
    let mut total = 1;
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("skipping {}: {e}", root.display());
            return total;
        },
    };
    for entry in entries.flatten() {
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            total += count_dirs(&entry.path());
        }
    }
    total
}

/// Walk the tree under `root` and collect files whose name contains
/// `pattern`, compared case-insensitively.
///
/// `on_dir` fires once per directory entered, `root` included, so a
/// progress bar sized by [`count_dirs`] lands exactly on its total.
/// Symlinked directories are treated as plain entries and not
/// descended into.
pub fn find_files(root: &Path, pattern: &str, on_dir: &mut dyn FnMut()) -> Vec<PathBuf> {
    let needle = pattern.to_lowercase();
    let mut found = Vec::new();
    walk(root, &needle, on_dir, &mut found);
    found
}

fn walk(dir: &Path, needle: &str, on_dir: &mut dyn FnMut(), found: &mut Vec<PathBuf>) {
    on_dir();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("skipping {}: {e}", dir.display());
            return;
        },
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            walk(&path, needle, on_dir, found);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_lowercase().contains(needle))
        {
            found.push(path);
        }
    }
}
