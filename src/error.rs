use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::valence::ValenceError;

/// Errors that end a load early.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A record failed the valence check under [`FailurePolicy::Abort`](crate::loader::FailurePolicy::Abort).
    #[error("line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: ValenceError,
    },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}
