use clap::{ArgAction, Args, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    name = "ctxcat",
    about = "Concatenate selected project files into one LLM-ready context document.",
    long_about = "ctxcat walks a project directory, applies gitignore-style filtering, and \nconcatenates the selected files into a single plain, XML-ish, or Markdown \ndocument with an approximate token count for prompt budgeting.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  ctxcat\n  ctxcat ~/src/app -f markdown -n -o context.md\n  ctxcat --select src --select Cargo.toml --copy\n  ctxcat -e rs -e toml --tree --watch"
)]
pub struct CliArgs {
    #[arg(
        value_name = "ROOT",
        default_value = ".",
        help = "Project directory to assemble context from."
    )]
    pub root: PathBuf,

    #[clap(flatten)]
    pub selection: SelectionOpts,

    #[clap(flatten)]
    pub rendering: RenderOpts,

    #[clap(flatten)]
    pub filters: FilterOpts,

    #[clap(flatten)]
    pub target: OutputOpts,

    #[clap(flatten)]
    pub watch: WatchOpts,

    #[arg(
        long,
        help = "Skip loading the .ctxcat.toml preferences file.",
        help_heading = "Project Setup"
    )]
    pub no_prefs: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(short, long, help = "Silence informational messages and warnings.")]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectionOpts {
    #[arg(
        short = 's',
        long = "select",
        value_name = "PATH",
        action = ArgAction::Append,
        help = "Restrict the document to this file or directory (repeatable; default: the whole root).",
        help_heading = "Selection"
    )]
    pub select: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RenderOpts {
    #[arg(
        short = 'f',
        long,
        value_name = "FORMAT",
        value_parser = ["plain", "xml", "markdown"],
        help = "Set the output format [default: xml].",
        help_heading = "Output Formatting"
    )]
    pub format: Option<String>,

    #[arg(
        short = 'n',
        long,
        help = "Prefix each content line with its 1-based line number.",
        help_heading = "Output Formatting"
    )]
    pub line_numbers: bool,

    #[arg(
        long,
        help = "Prepend an ASCII tree of the project structure.",
        help_heading = "Output Formatting"
    )]
    pub tree: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterOpts {
    #[arg(
        short = 'e',
        long = "ext",
        value_name = "EXT",
        action = ArgAction::Append,
        help = "Only include files with this extension (repeatable; none = all).",
        help_heading = "Filtering"
    )]
    pub ext: Vec<String>,

    #[arg(
        long,
        help = "Ignore .gitignore files when scanning.",
        help_heading = "Filtering"
    )]
    pub no_gitignore: bool,

    #[arg(
        long,
        help = "Include hidden files and directories.",
        help_heading = "Filtering"
    )]
    pub hidden: bool,

    #[arg(
        long,
        value_name = "SIZE",
        help = "Per-file size ceiling, e.g. '512 KiB' or '2MB' [default: 2 MiB].",
        help_heading = "Filtering"
    )]
    pub max_file_size: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputOpts {
    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the document to FILE instead of stdout (relative paths resolve against ROOT).",
        help_heading = "Output Control"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Copy the document to the system clipboard.",
        help_heading = "Output Control"
    )]
    pub copy: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WatchOpts {
    #[arg(
        short = 'w',
        long,
        help = "Rebuild the document whenever files under the root change.",
        help_heading = "Watch Mode"
    )]
    pub watch: bool,

    #[arg(
        long,
        value_name = "DELAY",
        help = "Debounce delay between rebuilds, e.g. '300ms' or '2s' [default: 300ms].",
        help_heading = "Watch Mode"
    )]
    pub debounce: Option<String>,
}
