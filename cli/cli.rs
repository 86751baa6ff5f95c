mod cli_args;
mod output;
mod prefs;
mod watch;

use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use byte_unit::Byte;
use clap::Parser;
use colored::*;
use log;

use ctxcat_engine::{Config, EngineError, Format, Selection};

use crate::cli_args::CliArgs;
use crate::prefs::Prefs;

const DEFAULT_DEBOUNCE: &str = "300ms";

fn main() {
    let args = CliArgs::parse();
    setup_logging(args.quiet, args.verbose);
    let quiet = args.quiet;
    log::debug!("CLI args parsed: {:?}", args);

    let exit_code = match run_app(args, quiet) {
        Ok(()) => {
            log::info!("Finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = match e.downcast_ref::<EngineError>() {
                Some(EngineError::RootNotFound { .. })
                | Some(EngineError::NotADirectory { .. }) => 1,
                Some(EngineError::Io(_))
                | Some(EngineError::FileWrite { .. })
                | Some(EngineError::DirCreation { .. }) => 2,
                Some(EngineError::UnknownFormat(_))
                | Some(EngineError::InvalidArgument(_)) => 5,
                Some(_) => 1,
                None => 1,
            };
            if !quiet {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            }
            log::error!("Application failed: {:#}", e);
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(args: CliArgs, quiet: bool) -> Result<()> {
    let root = ctxcat_engine::resolve_root(&args.root)?;
    log::info!("Project root: {}", root.display());

    let prefs = if args.no_prefs {
        log::debug!("Preferences file disabled via flag");
        None
    } else {
        prefs::load(&root)?
    };

    let config = effective_config(&args, prefs.as_ref())?;
    log::debug!("Effective configuration: {:?}", config);

    let selection = build_selection(&root, &args.selection.select);
    let target = output::Target {
        file: resolve_output_path(&root, args.target.output.as_ref(), prefs.as_ref()),
        copy: args.target.copy,
    };

    if args.watch.watch {
        let debounce = parse_debounce(args.watch.debounce.as_deref(), prefs.as_ref())?;
        watch::run_watch_mode(&root, &args, &selection, config, &target, debounce, quiet)
    } else {
        let document = ctxcat_engine::build(&root, &selection, &config)?;
        output::emit(&document, &target, quiet)
    }
}

// Layered settings: built-in defaults, then the preferences file, then
// command-line flags.
pub(crate) fn effective_config(args: &CliArgs, prefs: Option<&Prefs>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(prefs) = prefs {
        if let Some(format) = &prefs.format {
            config.format = Format::from_str(format)?;
        }
        if let Some(line_numbers) = prefs.line_numbers {
            config.line_numbers = line_numbers;
        }
        if let Some(extensions) = &prefs.extensions {
            config.extensions = extensions.iter().cloned().collect();
        }
        if let Some(respect) = prefs.respect_gitignore {
            config.respect_gitignore = respect;
        }
        if let Some(hidden) = prefs.include_hidden {
            config.include_hidden = hidden;
        }
        if let Some(tree) = prefs.include_tree {
            config.include_tree = tree;
        }
        if let Some(size) = &prefs.max_file_size {
            config.max_file_size = parse_size(size)?;
        }
    }

    if let Some(format) = &args.rendering.format {
        config.format = Format::from_str(format)?;
    }
    if args.rendering.line_numbers {
        config.line_numbers = true;
    }
    if args.rendering.tree {
        config.include_tree = true;
    }
    if !args.filters.ext.is_empty() {
        config.extensions = args.filters.ext.iter().cloned().collect();
    }
    if args.filters.no_gitignore {
        config.respect_gitignore = false;
    }
    if args.filters.hidden {
        config.include_hidden = true;
    }
    if let Some(size) = &args.filters.max_file_size {
        config.max_file_size = parse_size(size)?;
    }

    Ok(config)
}

fn parse_size(value: &str) -> Result<u64> {
    let byte_value = Byte::from_str(value).map_err(|e| {
        EngineError::InvalidArgument(format!(
            "Invalid size '{}': {}. Use a value like '512 KiB' or '2MB'.",
            value, e
        ))
    })?;
    let bytes: u128 = byte_value.into();
    let bytes = u64::try_from(bytes).map_err(|_| {
        EngineError::InvalidArgument(format!("Size '{}' exceeds the supported range.", value))
    })?;
    Ok(bytes)
}

fn parse_debounce(flag: Option<&str>, prefs: Option<&Prefs>) -> Result<Duration> {
    let value = flag
        .map(str::to_string)
        .or_else(|| prefs.and_then(|p| p.debounce.clone()))
        .unwrap_or_else(|| DEFAULT_DEBOUNCE.to_string());
    let duration = parse_duration::parse(&value).map_err(|e| {
        EngineError::InvalidArgument(format!(
            "Invalid debounce duration '{}': {}. Use a value like '300ms' or '2s'.",
            value, e
        ))
    })?;
    Ok(duration)
}

// No explicit selection means the whole root. Relative entries resolve
// against the root, not the current directory.
fn build_selection(root: &Path, selected: &[PathBuf]) -> Selection {
    if selected.is_empty() {
        return Selection::single(root.to_path_buf());
    }
    selected
        .iter()
        .map(|path| {
            let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
            let absolute = if expanded.is_absolute() {
                expanded
            } else {
                root.join(expanded)
            };
            absolute.canonicalize().unwrap_or(absolute)
        })
        .collect()
}

fn resolve_output_path(
    root: &Path,
    flag: Option<&PathBuf>,
    prefs: Option<&Prefs>,
) -> Option<PathBuf> {
    let chosen = flag.cloned().or_else(|| prefs.and_then(|p| p.output.clone()))?;
    let expanded = PathBuf::from(shellexpand::tilde(&chosen.to_string_lossy()).as_ref());
    Some(if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    })
}
