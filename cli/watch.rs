use std::io::IsTerminal;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::*;
use ctxcat_engine::{Config, RuleSet, Selection, build_rule_set, build_with_rule_set};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;

use crate::cli_args::CliArgs;
use crate::output::{self, Target};
use crate::prefs;

pub fn run_watch_mode(
    root: &Path,
    args: &CliArgs,
    selection: &Selection,
    mut config: Config,
    target: &Target,
    debounce: Duration,
    quiet: bool,
) -> Result<()> {
    if !quiet {
        eprintln!(
            "👀 Watching '{}' (debounce {:?}). Press Ctrl+C to exit.",
            root.display(),
            debounce
        );
    }

    let mut rules = build_rule_set(root, &config)?;
    rebuild(root, selection, &config, &rules, target, quiet);

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(debounce, tx).context("Failed to create file watcher")?;
    debouncer
        .watcher()
        .watch(root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", root.display()))?;

    // Resolved after the first rebuild so the output file exists.
    let output_path = target
        .file
        .as_ref()
        .map(|p| p.canonicalize().unwrap_or_else(|_| p.clone()));
    let prefs_path = root.join(prefs::PREFS_FILENAME);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                if events.is_empty() {
                    continue;
                }
                log::debug!("{} filesystem event(s) received", events.len());
                for event in &events {
                    log::trace!("Debounced event: {:?}", event);
                }

                // Writing our own output file must not retrigger a rebuild.
                let significant = events.iter().any(|event| {
                    let canonical = event
                        .path
                        .canonicalize()
                        .unwrap_or_else(|_| event.path.clone());
                    output_path.as_deref() != Some(canonical.as_path())
                });
                if !significant {
                    log::trace!("All events target the output file, skipping rebuild");
                    continue;
                }

                let rules_changed = events.iter().any(|event| {
                    event
                        .path
                        .file_name()
                        .map_or(false, |name| name == ".gitignore")
                        || event.path == prefs_path
                });
                if rules_changed {
                    if !quiet {
                        eprintln!("{}", "🔄 Filter rules changed, reloading...".blue());
                    }
                    match reload(root, args) {
                        Ok((new_config, new_rules)) => {
                            config = new_config;
                            rules = new_rules;
                        }
                        Err(e) => {
                            if !quiet {
                                eprintln!(
                                    "{} {:#}",
                                    "⚠️ Error reloading configuration:".yellow(),
                                    e
                                );
                            }
                            log::warn!("Keeping the previous configuration: {:#}", e);
                        }
                    }
                }

                rebuild(root, selection, &config, &rules, target, quiet);
            }
            Ok(Err(error)) => {
                if !quiet {
                    eprintln!("{} {}", "⚠️ Watch error:".yellow(), error);
                }
                log::error!("Notify error received: {:?}", error);
            }
            Err(e) => {
                eprintln!("{} {}", "⛔ Watcher channel closed:".red(), e);
                break Ok(());
            }
        }
    }
}

fn reload(root: &Path, args: &CliArgs) -> Result<(Config, RuleSet)> {
    let prefs = if args.no_prefs {
        None
    } else {
        prefs::load(root)?
    };
    let config = crate::effective_config(args, prefs.as_ref())?;
    let rules = build_rule_set(root, &config)?;
    Ok((config, rules))
}

fn rebuild(
    root: &Path,
    selection: &Selection,
    config: &Config,
    rules: &RuleSet,
    target: &Target,
    quiet: bool,
) {
    if target.is_stdout() && std::io::stdout().is_terminal() {
        if let Err(e) = clearscreen::clear() {
            log::warn!("Failed to clear the screen: {}", e);
        }
    }
    match build_with_rule_set(root, selection, config, rules) {
        Ok(document) => {
            if let Err(e) = output::emit(&document, target, quiet) {
                if !quiet {
                    eprintln!("{} {:#}", "⚠️ Error writing output:".yellow(), e);
                }
            }
        }
        Err(e) => {
            if !quiet {
                eprintln!("{} {:#}", "⚠️ Error during rebuild:".yellow(), e);
            }
        }
    }
}
