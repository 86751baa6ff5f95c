use std::path::Path;

use crate::collect;
use crate::config::{self, Config, Selection};
use crate::error::Result;
use crate::format;
use crate::loader::{self, LoadOutcome, LoadedFile, SkippedFile};
use crate::rules::{self, RuleSet};
use crate::tokens;
use crate::tree;

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub text: String,
    pub token_count: usize,
    pub file_count: usize,
    pub skipped: Vec<SkippedFile>,
}

pub fn build(root: &Path, selection: &Selection, config: &Config) -> Result<RenderedDocument> {
    let rules = rules::build_rule_set(root, config)?;
    build_with_rule_set(root, selection, config, &rules)
}

// Same as build, but reuses an already compiled rule set. Watch mode calls
// this on every rebuild and only recompiles the rules when they change.
pub fn build_with_rule_set(
    root: &Path,
    selection: &Selection,
    config: &Config,
    rules: &RuleSet,
) -> Result<RenderedDocument> {
    let root = config::resolve_root(root)?;
    let (entries, mut skipped) = collect::collect(&root, selection, rules);

    let mut loaded = Vec::with_capacity(entries.len());
    for entry in &entries {
        match loader::load(entry, config.max_file_size) {
            LoadOutcome::Text(content) => loaded.push(LoadedFile {
                path: entry.path.clone(),
                content,
            }),
            LoadOutcome::Skipped(reason) => skipped.push(SkippedFile {
                path: entry.path.clone(),
                reason,
            }),
        }
    }

    let tree = if config.include_tree {
        Some(tree::render_tree(&root, rules))
    } else {
        None
    };

    let text = format::render(&loaded, tree.as_deref(), config);
    let token_count = tokens::count_tokens(&text);
    skipped.sort_by(|a, b| a.path.cmp(&b.path));

    log::info!(
        "Assembled {} file(s), {} skipped, ~{} tokens",
        loaded.len(),
        skipped.len(),
        token_count
    );

    Ok(RenderedDocument {
        text,
        token_count,
        file_count: loaded.len(),
        skipped,
    })
}
