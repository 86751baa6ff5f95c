use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::*;
use ctxcat_engine::{EngineError, RenderedDocument};

pub struct Target {
    pub file: Option<PathBuf>,
    pub copy: bool,
}

impl Target {
    pub fn is_stdout(&self) -> bool {
        self.file.is_none() && !self.copy
    }
}

// Delivers a rendered document: file, clipboard, or stdout. Everything that
// is not the document itself goes to stderr so stdout stays pipeable.
pub fn emit(document: &RenderedDocument, target: &Target, quiet: bool) -> Result<()> {
    if let Some(path) = &target.file {
        write_to_file(path, &document.text)?;
        if !quiet {
            eprintln!(
                "{} Context saved to: {}",
                "✅".green(),
                path.display().to_string().blue()
            );
        }
    }
    if target.copy {
        copy_to_clipboard(&document.text)?;
        if !quiet {
            eprintln!("{} Context copied to the clipboard.", "📋".green());
        }
    }
    if target.is_stdout() {
        write_to_stdout(&document.text)?;
    }
    report(document, quiet);
    Ok(())
}

fn report(document: &RenderedDocument, quiet: bool) {
    if quiet {
        return;
    }
    if !document.skipped.is_empty() {
        eprintln!("{}", "⚠️ Skipped files:".yellow());
        for skip in &document.skipped {
            eprintln!(" - {} ({})", skip.path.display(), skip.reason);
        }
    }
    eprintln!(
        "{} {} files, {} skipped, {} tokens",
        "📄".green(),
        document.file_count.to_string().cyan(),
        document.skipped.len().to_string().yellow(),
        document.token_count.to_string().cyan()
    );
}

fn write_to_file(path: &PathBuf, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| EngineError::DirCreation {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    let mut file = File::create(path).map_err(|e| EngineError::FileWrite {
        path: path.clone(),
        source: e,
    })?;
    file.write_all(content.as_bytes())
        .map_err(|e| EngineError::FileWrite {
            path: path.clone(),
            source: e,
        })?;
    Ok(())
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn copy_to_clipboard(content: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Failed to access the clipboard")?;
    clipboard
        .set_text(content.to_string())
        .context("Failed to copy to the clipboard")?;
    Ok(())
}
