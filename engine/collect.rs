use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Selection;
use crate::loader::{SkipReason, SkippedFile};
use crate::rules::RuleSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    // Relative to the project root; the identity used for ordering,
    // deduplication, and document headers.
    pub path: PathBuf,
    pub absolute_path: PathBuf,
    pub size: u64,
}

// Expands the selection into the ordered, deduplicated file list. Explicitly
// selected files bypass the exclusion rules; directory walks do not.
pub fn collect(
    root: &Path,
    selection: &Selection,
    rules: &RuleSet,
) -> (Vec<FileEntry>, Vec<SkippedFile>) {
    let mut entries: BTreeMap<PathBuf, FileEntry> = BTreeMap::new();
    let mut skipped = Vec::new();
    log::debug!(
        "Expanding {} selection entr(ies) under {}",
        selection.len(),
        root.display()
    );

    for selected in selection.iter() {
        let joined = if selected.is_absolute() {
            selected.clone()
        } else {
            root.join(selected)
        };
        // Dotted or symlinked spellings of the same file must collapse to a
        // single relative key, or that file would appear twice. Vanished
        // paths cannot be canonicalized and are normalized lexically so the
        // skip entry still carries a clean relative path.
        let absolute = joined
            .canonicalize()
            .unwrap_or_else(|_| normalize_lexically(&joined));
        let relative = match pathdiff::diff_paths(&absolute, root) {
            Some(rel) if !rel.starts_with("..") => rel,
            _ => {
                log::warn!(
                    "Selected path {} lies outside the project root, ignoring it",
                    absolute.display()
                );
                continue;
            }
        };
        let metadata = match fs::metadata(&absolute) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::debug!("Cannot stat selected path {}: {}", absolute.display(), e);
                skipped.push(SkippedFile {
                    path: relative,
                    reason: SkipReason::ReadError,
                });
                continue;
            }
        };
        if metadata.is_file() {
            entries.entry(relative.clone()).or_insert_with(|| FileEntry {
                path: relative,
                absolute_path: absolute,
                size: metadata.len(),
            });
        } else if metadata.is_dir() {
            walk_directory(root, &absolute, rules, &mut entries);
        } else {
            log::debug!(
                "Selected path {} is neither a file nor a directory",
                absolute.display()
            );
            skipped.push(SkippedFile {
                path: relative,
                reason: SkipReason::ReadError,
            });
        }
    }

    log::debug!("Collected {} file(s), {} selection skip(s)", entries.len(), skipped.len());
    (entries.into_values().collect(), skipped)
}

// Resolves `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn walk_directory(
    root: &Path,
    dir: &Path,
    rules: &RuleSet,
    entries: &mut BTreeMap<PathBuf, FileEntry>,
) {
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|dirent| {
            if dirent.depth() == 0 {
                // The selected directory itself.
                return true;
            }
            match pathdiff::diff_paths(dirent.path(), root) {
                Some(rel) => {
                    let is_dir = dirent.file_type().is_dir();
                    let excluded = rules.is_excluded(&rel, is_dir);
                    if excluded {
                        log::trace!("Excluded: {}", rel.display());
                    }
                    !excluded
                }
                None => {
                    log::warn!("Could not relativize {}", dirent.path().display());
                    false
                }
            }
        });

    for dirent in walker {
        let dirent = match dirent {
            Ok(dirent) => dirent,
            Err(e) => {
                log::warn!("Error while scanning {}: {}", dir.display(), e);
                continue;
            }
        };
        if !dirent.file_type().is_file() {
            continue;
        }
        let relative = match pathdiff::diff_paths(dirent.path(), root) {
            Some(rel) => rel,
            None => continue,
        };
        let size = match dirent.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                log::debug!("Cannot stat {}: {}", dirent.path().display(), e);
                0
            }
        };
        log::trace!("Including: {}", relative.display());
        entries.entry(relative.clone()).or_insert_with(|| FileEntry {
            path: relative,
            absolute_path: dirent.path().to_path_buf(),
            size,
        });
    }
}
