use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::collect::FileEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BinaryContent,
    TooLarge,
    ReadError,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            SkipReason::BinaryContent => "binary-content",
            SkipReason::TooLarge => "too-large",
            SkipReason::ReadError => "read-error",
        };
        f.write_str(code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Text(String),
    Skipped(SkipReason),
}

pub fn load(entry: &FileEntry, max_file_size: u64) -> LoadOutcome {
    // Fresh metadata: the file may have changed or vanished since collection.
    let size = match fs::metadata(&entry.absolute_path) {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            log::debug!("Cannot stat {}: {}", entry.absolute_path.display(), e);
            return LoadOutcome::Skipped(SkipReason::ReadError);
        }
    };
    if size > max_file_size {
        log::debug!(
            "Skipping {}: {} bytes exceeds the {} byte limit",
            entry.path.display(),
            size,
            max_file_size
        );
        return LoadOutcome::Skipped(SkipReason::TooLarge);
    }
    let bytes = match fs::read(&entry.absolute_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("Failed to read {}: {}", entry.absolute_path.display(), e);
            return LoadOutcome::Skipped(SkipReason::ReadError);
        }
    };
    if bytes.contains(&0) {
        log::debug!("Skipping {}: contains a null byte", entry.path.display());
        return LoadOutcome::Skipped(SkipReason::BinaryContent);
    }
    match String::from_utf8(bytes) {
        Ok(text) => LoadOutcome::Text(text),
        Err(e) => {
            log::debug!("Decoding {} lossily: not valid UTF-8", entry.path.display());
            LoadOutcome::Text(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}
