pub mod assemble;
pub mod collect;
pub mod config;
pub mod error;
pub mod format;
pub mod loader;
pub mod rules;
pub mod tokens;
pub mod tree;

pub use assemble::{RenderedDocument, build, build_with_rule_set};
pub use collect::FileEntry;
pub use config::{Config, DEFAULT_MAX_FILE_SIZE, Format, Selection, resolve_root};
pub use error::{EngineError, Result};
pub use loader::{LoadedFile, SkipReason, SkippedFile};
pub use rules::{RuleSet, build_rule_set};
pub use tokens::count_tokens;
