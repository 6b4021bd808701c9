use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlakyError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed report {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid glob pattern: {0}")]
    Glob(String),

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl FlakyError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }
}

impl From<rusqlite::Error> for FlakyError {
    fn from(e: rusqlite::Error) -> Self {
        FlakyError::Store(e.to_string())
    }
}

impl From<globset::Error> for FlakyError {
    fn from(e: globset::Error) -> Self {
        FlakyError::Glob(e.to_string())
    }
}

pub type Result<T, E = FlakyError> = std::result::Result<T, E>;
