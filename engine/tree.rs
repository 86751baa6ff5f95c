use std::fs;
use std::path::Path;

use crate::rules::RuleSet;

struct Node {
    name: String,
    is_dir: bool,
    children: Vec<Node>,
}

// ASCII tree of the directory structure under the root, honoring the same
// exclusion rules as the file walk.
pub fn render_tree(root: &Path, rules: &RuleSet) -> String {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string());
    let nodes = build_nodes(root, root, rules);
    let mut out = String::new();
    out.push_str(&name);
    out.push('\n');
    render_nodes(&nodes, "", &mut out);
    out
}

fn build_nodes(dir: &Path, root: &Path, rules: &RuleSet) -> Vec<Node> {
    let reader = match fs::read_dir(dir) {
        Ok(reader) => reader,
        Err(e) => {
            log::warn!("Cannot read directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    let mut nodes = Vec::new();
    for entry in reader {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Error while listing {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
        let relative = match pathdiff::diff_paths(&path, root) {
            Some(rel) => rel,
            None => continue,
        };
        if rules.is_excluded(&relative, is_dir) {
            continue;
        }
        let children = if is_dir {
            build_nodes(&path, root, rules)
        } else {
            Vec::new()
        };
        nodes.push(Node {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            children,
        });
    }
    // Directories first, then case-insensitive name order.
    nodes.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
    nodes
}

fn render_nodes(nodes: &[Node], prefix: &str, out: &mut String) {
    for (idx, node) in nodes.iter().enumerate() {
        let last = idx + 1 == nodes.len();
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&node.name);
        out.push('\n');
        if !node.children.is_empty() {
            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            render_nodes(&node.children, &child_prefix, out);
        }
    }
}
