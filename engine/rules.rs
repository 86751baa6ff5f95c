use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path};

use crate::config::{self, Config};
use crate::error::Result;

// Always excluded, before any .gitignore is consulted.
const BUILTIN_IGNORES: &[&str] = &[".git/", ".hg/", ".svn/"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum SegmentPat {
    // `**`, spans zero or more path components.
    Any,
    // A single component, with `*` matching any run of characters.
    Glob(String),
}

#[derive(Debug, Clone)]
struct Rule {
    segments: Vec<SegmentPat>,
    negated: bool,
    dir_only: bool,
    // Root path relative to the directory of the defining .gitignore, so
    // anchored rules from ancestor files keep their original meaning.
    offset: Vec<String>,
    source: String,
}

impl Rule {
    // Returns None for blank lines, comments, and patterns outside the
    // supported subset. Unsupported patterns never match anything.
    fn parse(line: &str, offset: &[String]) -> Option<Rule> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        let (negated, rest) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (dir_only, rest) = match rest.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        // A slash anywhere in the pattern anchors it to the .gitignore's
        // directory; otherwise it matches at any depth.
        let anchored = rest.contains('/');
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        if rest.is_empty() {
            return None;
        }
        let mut segments = Vec::new();
        if !anchored {
            segments.push(SegmentPat::Any);
        }
        let parts: Vec<&str> = rest.split('/').collect();
        for (idx, segment) in parts.iter().enumerate() {
            if segment.is_empty() {
                return None;
            }
            if *segment == "**" {
                segments.push(SegmentPat::Any);
                // A trailing `**` matches a directory's contents, not the
                // directory itself, so it must consume at least one component.
                if idx + 1 == parts.len() {
                    segments.push(SegmentPat::Glob("*".to_string()));
                }
            } else {
                segments.push(SegmentPat::Glob(segment.to_string()));
            }
        }
        Some(Rule {
            segments,
            negated,
            dir_only,
            offset: offset.to_vec(),
            source: trimmed.to_string(),
        })
    }

    fn matches(&self, components: &[&str]) -> bool {
        if self.offset.is_empty() {
            match_segments(&self.segments, components)
        } else {
            let mut full: Vec<&str> = self.offset.iter().map(String::as_str).collect();
            full.extend_from_slice(components);
            match_segments(&self.segments, &full)
        }
    }
}

fn match_segments(patterns: &[SegmentPat], components: &[&str]) -> bool {
    match patterns.split_first() {
        None => components.is_empty(),
        Some((SegmentPat::Any, rest)) => {
            (0..=components.len()).any(|skip| match_segments(rest, &components[skip..]))
        }
        Some((SegmentPat::Glob(glob), rest)) => match components.split_first() {
            Some((head, tail)) => match_component(glob, head) && match_segments(rest, tail),
            None => false,
        },
    }
}

// Literal match over a single component, with `*` as the only wildcard.
fn match_component(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let (mut p, mut n) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while n < name.len() {
        if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, n));
            p += 1;
        } else if p < pattern.len() && pattern[p] == name[n] {
            p += 1;
            n += 1;
        } else if let Some((star, start)) = backtrack {
            p = star + 1;
            n = start + 1;
            backtrack = Some((star, start + 1));
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

// Compiled exclusion rules plus the extension allowlist and hidden-file
// policy. Immutable once built; share by reference across rebuilds.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    extensions: BTreeSet<String>,
    include_hidden: bool,
}

impl RuleSet {
    pub fn is_excluded(&self, relative_path: &Path, is_dir: bool) -> bool {
        // Matching operates on the lossy UTF-8 form of each component; names
        // that differ only in invalid byte sequences are indistinguishable
        // here and share one exclusion verdict.
        let components: Vec<String> = relative_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if components.is_empty() {
            // The root itself.
            return false;
        }
        if !self.include_hidden && components.iter().any(|c| c.starts_with('.')) {
            return true;
        }
        let refs: Vec<&str> = components.iter().map(String::as_str).collect();
        // An excluded ancestor directory excludes everything below it, even
        // when a later rule re-includes one of its children.
        for end in 1..refs.len() {
            if self.polarity(&refs[..end], true) == Some(true) {
                return true;
            }
        }
        if self.polarity(&refs, is_dir) == Some(true) {
            return true;
        }
        if !is_dir && !self.extensions.is_empty() {
            let extension = relative_path
                .extension()
                .map(|e| e.to_string_lossy().to_ascii_lowercase())
                .unwrap_or_default();
            if !self.extensions.contains(extension.as_str()) {
                return true;
            }
        }
        false
    }

    // The last matching rule decides; None when no rule matched at all.
    fn polarity(&self, components: &[&str], is_dir: bool) -> Option<bool> {
        let mut excluded = None;
        for rule in &self.rules {
            if rule.dir_only && !is_dir {
                continue;
            }
            if rule.matches(components) {
                excluded = Some(!rule.negated);
            }
        }
        excluded
    }
}

pub fn build_rule_set(root: &Path, config: &Config) -> Result<RuleSet> {
    let root = config::resolve_root(root)?;
    let mut rules = Vec::new();
    for pattern in BUILTIN_IGNORES {
        if let Some(rule) = Rule::parse(pattern, &[]) {
            rules.push(rule);
        }
    }
    if config.respect_gitignore {
        // Outermost ancestor first, so rules nearer the root win ties.
        let mut chain: Vec<&Path> = root.ancestors().collect();
        chain.reverse();
        for dir in chain {
            let gitignore = dir.join(".gitignore");
            if !gitignore.is_file() {
                continue;
            }
            let offset = offset_components(&root, dir);
            match fs::read_to_string(&gitignore) {
                Ok(content) => {
                    let before = rules.len();
                    for line in content.lines() {
                        if let Some(rule) = Rule::parse(line, &offset) {
                            log::trace!("Loaded pattern '{}' from {}", rule.source, gitignore.display());
                            rules.push(rule);
                        }
                    }
                    log::debug!(
                        "Loaded {} pattern(s) from {}",
                        rules.len() - before,
                        gitignore.display()
                    );
                }
                Err(e) => {
                    log::warn!("Could not read {}: {}", gitignore.display(), e);
                }
            }
        }
    }
    let extensions = config
        .extensions
        .iter()
        .map(|e| normalize_extension(e))
        .filter(|e| !e.is_empty())
        .collect();
    Ok(RuleSet {
        rules,
        extensions,
        include_hidden: config.include_hidden,
    })
}

fn offset_components(root: &Path, dir: &Path) -> Vec<String> {
    pathdiff::diff_paths(root, dir)
        .map(|rel| {
            rel.components()
                .filter_map(|c| match c {
                    Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_set(patterns: &[&str]) -> RuleSet {
        RuleSet {
            rules: patterns.iter().filter_map(|p| Rule::parse(p, &[])).collect(),
            extensions: BTreeSet::new(),
            include_hidden: true,
        }
    }

    fn excluded(set: &RuleSet, path: &str, is_dir: bool) -> bool {
        set.is_excluded(Path::new(path), is_dir)
    }

    #[test]
    fn literal_and_star_patterns_match_file_names() {
        let set = rule_set(&["*.png", "notes.txt"]);
        assert!(excluded(&set, "b.png", false));
        assert!(excluded(&set, "deep/nested/c.png", false));
        assert!(excluded(&set, "notes.txt", false));
        assert!(!excluded(&set, "a.py", false));
        assert!(!excluded(&set, "png", false));
    }

    #[test]
    fn star_does_not_cross_directory_boundaries() {
        let set = rule_set(&["src/*.rs"]);
        assert!(excluded(&set, "src/main.rs", false));
        assert!(!excluded(&set, "src/bin/extra.rs", false));
    }

    #[test]
    fn double_star_spans_zero_or_more_directories() {
        let set = rule_set(&["docs/**/*.md"]);
        assert!(excluded(&set, "docs/intro.md", false));
        assert!(excluded(&set, "docs/guide/part/one.md", false));
        assert!(!excluded(&set, "docs/intro.txt", false));
        assert!(!excluded(&set, "other/intro.md", false));
    }

    #[test]
    fn trailing_double_star_excludes_contents_but_not_the_directory() {
        let set = rule_set(&["logs/**"]);
        assert!(!excluded(&set, "logs", true));
        assert!(excluded(&set, "logs/today.txt", false));
        assert!(excluded(&set, "logs/archive", true));
        assert!(excluded(&set, "logs/archive/old.txt", false));
    }

    #[test]
    fn leading_slash_anchors_to_the_root() {
        let set = rule_set(&["/top.txt"]);
        assert!(excluded(&set, "top.txt", false));
        assert!(!excluded(&set, "sub/top.txt", false));
    }

    #[test]
    fn unanchored_name_matches_at_any_depth() {
        let set = rule_set(&["node_modules"]);
        assert!(excluded(&set, "node_modules", true));
        assert!(excluded(&set, "web/node_modules", true));
        assert!(excluded(&set, "web/node_modules/left-pad/index.js", false));
    }

    #[test]
    fn trailing_slash_applies_to_directories_only() {
        let set = rule_set(&["build/"]);
        assert!(excluded(&set, "build", true));
        assert!(!excluded(&set, "build", false));
        // Files under an excluded directory go with it.
        assert!(excluded(&set, "build/out.txt", false));
    }

    #[test]
    fn later_negation_reincludes_a_file() {
        let set = rule_set(&["*.log", "!keep.log"]);
        assert!(excluded(&set, "noise.log", false));
        assert!(!excluded(&set, "keep.log", false));
    }

    #[test]
    fn the_last_matching_rule_wins() {
        let set = rule_set(&["!keep.log", "*.log"]);
        assert!(excluded(&set, "keep.log", false));

        let set = rule_set(&["*.log", "!keep.log", "keep.log"]);
        assert!(excluded(&set, "keep.log", false));
    }

    #[test]
    fn negation_cannot_rescue_children_of_excluded_directories() {
        let set = rule_set(&["vendor/", "!vendor/keep.txt"]);
        assert!(excluded(&set, "vendor/keep.txt", false));
    }

    #[test]
    fn comments_blanks_and_malformed_patterns_never_match() {
        let set = rule_set(&["# *.txt", "", "   ", "!", "/", "a//b"]);
        assert!(!excluded(&set, "a.txt", false));
        assert!(!excluded(&set, "a/b", false));
    }

    #[test]
    fn builtin_vcs_directories_are_always_excluded() {
        let set = rule_set(BUILTIN_IGNORES);
        assert!(excluded(&set, ".git", true));
        assert!(excluded(&set, ".git/config", false));
        assert!(excluded(&set, "sub/.hg", true));
        assert!(!excluded(&set, "git", true));
    }

    #[test]
    fn hidden_paths_are_excluded_unless_opted_in() {
        let mut set = rule_set(&[]);
        set.include_hidden = false;
        assert!(excluded(&set, ".env", false));
        assert!(excluded(&set, "src/.cache/data.bin", false));
        assert!(!excluded(&set, "src/main.rs", false));

        set.include_hidden = true;
        assert!(!excluded(&set, ".env", false));
    }

    #[test]
    fn extension_allowlist_filters_files_but_not_directories() {
        let mut set = rule_set(&[]);
        set.extensions = ["py".to_string()].into_iter().collect();
        assert!(!excluded(&set, "a.py", false));
        assert!(excluded(&set, "b.rs", false));
        assert!(excluded(&set, "README", false));
        assert!(!excluded(&set, "src", true));
    }

    #[test]
    fn allowlist_applies_even_to_reincluded_files() {
        let mut set = rule_set(&["*.log", "!keep.log"]);
        set.extensions = ["py".to_string()].into_iter().collect();
        assert!(excluded(&set, "keep.log", false));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_match_on_their_lossy_form() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let set = rule_set(&["*.png"]);
        let latin1 = OsStr::from_bytes(b"caf\xe9.png");
        assert!(set.is_excluded(Path::new(latin1), false));
        let plain_suffix = OsStr::from_bytes(b"caf\xe9.txt");
        assert!(!set.is_excluded(Path::new(plain_suffix), false));
    }

    #[test]
    fn extensions_are_normalized_when_compiled() {
        assert_eq!(normalize_extension(".RS"), "rs");
        assert_eq!(normalize_extension(" py "), "py");
        assert_eq!(normalize_extension("toml"), "toml");
    }

    #[test]
    fn ancestor_gitignore_rules_keep_their_anchor() {
        // A rule from a .gitignore one level above the root. The root is
        // "project" inside that directory.
        let offset = vec!["project".to_string()];
        let anchored_elsewhere = Rule::parse("/cache", &offset).unwrap();
        let anchored_here = Rule::parse("/project/cache", &offset).unwrap();
        let unanchored = Rule::parse("cache", &offset).unwrap();

        assert!(!anchored_elsewhere.matches(&["cache"]));
        assert!(anchored_here.matches(&["cache"]));
        assert!(unanchored.matches(&["cache"]));
        assert!(unanchored.matches(&["deep", "cache"]));
    }

    #[test]
    fn rule_set_compiles_from_gitignore_files() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().canonicalize()?;
        fs::write(root.join(".gitignore"), "*.png\n# comment\n!logo.png\n")?;
        let set = build_rule_set(&root, &Config::default())?;
        assert!(set.is_excluded(Path::new("photo.png"), false));
        assert!(!set.is_excluded(Path::new("logo.png"), false));
        assert!(!set.is_excluded(Path::new("main.py"), false));
        Ok(())
    }

    #[test]
    fn gitignore_files_are_ignored_when_disabled() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().canonicalize()?;
        fs::write(root.join(".gitignore"), "*.png\n")?;
        let config = Config {
            respect_gitignore: false,
            ..Config::default()
        };
        let set = build_rule_set(&root, &config)?;
        assert!(!set.is_excluded(Path::new("photo.png"), false));
        // Built-ins still hold.
        assert!(set.is_excluded(Path::new(".git"), true));
        Ok(())
    }
}
