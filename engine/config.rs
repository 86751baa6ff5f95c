use std::collections::BTreeSet;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Plain,
    Xml,
    Markdown,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Plain => "plain",
            Format::Xml => "xml",
            Format::Markdown => "markdown",
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::Xml
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = EngineError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(Format::Plain),
            "xml" => Ok(Format::Xml),
            "markdown" | "md" => Ok(Format::Markdown),
            other => Err(EngineError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub format: Format,
    #[serde(default)]
    pub line_numbers: bool,
    #[serde(default)]
    pub extensions: BTreeSet<String>,
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default)]
    pub include_tree: bool,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_true() -> bool {
    true
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Config {
            format: Format::default(),
            line_numbers: false,
            extensions: BTreeSet::new(),
            respect_gitignore: default_true(),
            include_hidden: false,
            include_tree: false,
            max_file_size: default_max_file_size(),
        }
    }
}

// Selected files and directories, deduplicated and kept in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    paths: BTreeSet<PathBuf>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    pub fn single(path: impl Into<PathBuf>) -> Self {
        let mut selection = Selection::default();
        selection.insert(path.into());
        selection
    }

    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.paths.insert(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FromIterator<PathBuf> for Selection {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Selection {
            paths: iter.into_iter().collect(),
        }
    }
}

pub fn resolve_root(path: &Path) -> Result<PathBuf> {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
    let canonical = expanded.canonicalize().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            EngineError::RootNotFound {
                path: expanded.clone(),
            }
        } else {
            EngineError::Io(e)
        }
    })?;
    if !canonical.is_dir() {
        return Err(EngineError::NotADirectory { path: canonical });
    }
    Ok(canonical)
}
