use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    #[error("Project Root Not Found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Not A Directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Unknown Output Format: '{0}' (expected plain, xml, or markdown)")]
    UnknownFormat(String),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Write Error: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory Creation Error: {path}")]
    DirCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
}
