use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const PREFS_FILENAME: &str = ".ctxcat.toml";

// Per-project defaults, loaded from the root. Every field is optional;
// command-line flags override whatever is set here.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Prefs {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub line_numbers: Option<bool>,
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub respect_gitignore: Option<bool>,
    #[serde(default)]
    pub include_hidden: Option<bool>,
    #[serde(default)]
    pub include_tree: Option<bool>,
    #[serde(default)]
    pub max_file_size: Option<String>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub debounce: Option<String>,
}

pub fn load(root: &Path) -> Result<Option<Prefs>> {
    let path = root.join(PREFS_FILENAME);
    if !path.is_file() {
        log::debug!("No preferences file at {}", path.display());
        return Ok(None);
    }
    log::info!("Loading preferences from {}", path.display());
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let prefs: Prefs = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(prefs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_an_error() {
        let tmp = assert_fs::TempDir::new().unwrap();
        assert!(load(tmp.path()).unwrap().is_none());
    }

    #[test]
    fn fields_deserialize_and_default_to_none() {
        let prefs: Prefs = toml::from_str("format = \"markdown\"\nline_numbers = true").unwrap();
        assert_eq!(prefs.format.as_deref(), Some("markdown"));
        assert_eq!(prefs.line_numbers, Some(true));
        assert!(prefs.extensions.is_none());
        assert!(prefs.output.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Prefs>("no_such_key = 1").is_err());
    }
}
