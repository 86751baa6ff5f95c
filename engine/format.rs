use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::config::{Config, Format};
use crate::loader::LoadedFile;

// Extension to fenced-code-block language hint.
static LANG_HINTS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("c", "c"),
        ("cpp", "cpp"),
        ("css", "css"),
        ("go", "go"),
        ("html", "html"),
        ("java", "java"),
        ("js", "javascript"),
        ("json", "json"),
        ("kt", "kotlin"),
        ("md", "markdown"),
        ("php", "php"),
        ("py", "python"),
        ("rb", "ruby"),
        ("rs", "rust"),
        ("sh", "bash"),
        ("sql", "sql"),
        ("swift", "swift"),
        ("toml", "toml"),
        ("ts", "typescript"),
        ("tsx", "typescript"),
        ("xml", "xml"),
        ("yaml", "yaml"),
        ("yml", "yaml"),
    ])
});

pub fn render(files: &[LoadedFile], tree: Option<&str>, config: &Config) -> String {
    match config.format {
        Format::Plain => render_plain(files, tree, config.line_numbers),
        Format::Xml => render_xml(files, tree, config.line_numbers),
        Format::Markdown => render_markdown(files, tree, config.line_numbers),
    }
}

fn render_plain(files: &[LoadedFile], tree: Option<&str>, line_numbers: bool) -> String {
    let mut out = String::new();
    if let Some(tree) = tree {
        out.push_str("--- Project Structure ---\n");
        push_block(&mut out, tree);
        out.push_str("--- End Structure ---\n\n");
    }
    for file in files {
        let header = file.path.display().to_string();
        out.push_str(&header);
        out.push('\n');
        out.push_str(&"-".repeat(header.chars().count()));
        out.push('\n');
        push_block(&mut out, &body_for(&file.content, line_numbers));
        out.push('\n');
    }
    out
}

fn render_xml(files: &[LoadedFile], tree: Option<&str>, line_numbers: bool) -> String {
    let mut out = String::from("<documents>\n");
    if let Some(tree) = tree {
        out.push_str("<projectTree>\n");
        push_block(&mut out, tree);
        out.push_str("</projectTree>\n");
    }
    for file in files {
        out.push_str(&format!(
            "<document path=\"{}\">\n",
            escape_attr(&file.path.display().to_string())
        ));
        // Content goes in verbatim; only the attribute is escaped.
        push_block(&mut out, &body_for(&file.content, line_numbers));
        out.push_str("</document>\n");
    }
    out.push_str("</documents>\n");
    out
}

fn render_markdown(files: &[LoadedFile], tree: Option<&str>, line_numbers: bool) -> String {
    let mut out = String::new();
    if let Some(tree) = tree {
        out.push_str("**Project Structure:**\n\n");
        let fence = fence_for(tree);
        out.push_str(&fence);
        out.push('\n');
        push_block(&mut out, tree);
        out.push_str(&fence);
        out.push_str("\n\n");
    }
    for file in files {
        out.push_str(&format!("**File:** `{}`\n\n", file.path.display()));
        let body = body_for(&file.content, line_numbers);
        let fence = fence_for(&body);
        out.push_str(&fence);
        out.push_str(lang_hint(&file.path));
        out.push('\n');
        push_block(&mut out, &body);
        out.push_str(&fence);
        out.push_str("\n\n");
    }
    out
}

fn body_for(content: &str, line_numbers: bool) -> Cow<'_, str> {
    if line_numbers {
        Cow::Owned(number_lines(content))
    } else {
        Cow::Borrowed(content)
    }
}

// Appends text and guarantees the output ends with a newline afterwards.
fn push_block(out: &mut String, text: &str) {
    out.push_str(text);
    if !text.is_empty() && !text.ends_with('\n') {
        out.push('\n');
    }
}

fn number_lines(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let width = lines.len().to_string().len();
    let mut numbered = String::new();
    for (idx, line) in lines.iter().enumerate() {
        numbered.push_str(&format!("{:>width$}: {}\n", idx + 1, line));
    }
    numbered
}

// A fence longer than any backtick run in the content, at least three.
fn fence_for(content: &str) -> String {
    let mut longest = 0usize;
    let mut run = 0usize;
    for ch in content.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat(longest.max(2) + 1)
}

fn lang_hint(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .and_then(|e| LANG_HINTS.get(e.as_str()).copied())
        .unwrap_or("")
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
