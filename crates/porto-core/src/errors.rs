//! Error types for porto-core.
//!
//! Only structural preconditions surface as errors: a data directory that is
//! not usable, a broken `mappings.json`, unreadable files. Problems *inside*
//! the data never become errors; they become findings (see `crate::findings`).

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used across the crate.
pub type PortoResult<T> = Result<T, PortoError>;

#[derive(Debug, Error)]
pub enum PortoError {
    /// The project layout or configuration cannot be used.
    #[error("{0}")]
    Configuration(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl PortoError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// True for errors caused by project layout rather than file contents.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
