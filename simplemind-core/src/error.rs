//! Error types for resolution, lookup and rendering.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Empty identifier")]
    EmptyIdentifier,

    #[error("No renderer registered for extension: {0}")]
    UnknownRenderer(String),

    #[error("Unknown parser: {0}")]
    UnknownParser(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("File has no extension: {0}")]
    MissingExtension(PathBuf),

    #[error("No file path given")]
    EmptyFilePath,

    #[error("Content not found: {0}")]
    FileNotFound(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the "nothing matched" outcome, which callers map to a 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::FileNotFound(_))
    }
}
