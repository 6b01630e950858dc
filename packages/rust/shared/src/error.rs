//! The error model shared by the docview libraries.
//!
//! The binaries turn a [`DocViewError`] into a `color-eyre` report at the
//! edge; job failures never come through here, they live in the job state.

use std::path::PathBuf;

/// Anything that can go wrong outside a running job.
#[derive(Debug, thiserror::Error)]
pub enum DocViewError {
    /// The config file could not be read, or holds unusable values.
    #[error("config error: {message}")]
    Config { message: String },

    /// The generation backend could not be reached or answered badly.
    #[error("network error: {0}")]
    Network(String),

    /// A saved result or backend body did not have the expected shape.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Reading or writing `path` failed.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The caller passed something unusable, like an empty repository name.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// `Result` with [`DocViewError`] as the error.
pub type Result<T> = std::result::Result<T, DocViewError>;

impl DocViewError {
    /// [`DocViewError::Config`] with `msg`.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// [`DocViewError::Parse`] with `msg`.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// [`DocViewError::Validation`] with `msg`.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Attach the path that failed to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
