//! Page writer trait and error types
//!
//! This module defines the trait interface the workers use to persist
//! downloaded pages.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting a page
#[derive(Debug, Error)]
pub enum WriteError {
    /// The target file exists, so the page was already downloaded through
    /// another path of the link graph
    #[error("[{}] has been downloaded", .0.display())]
    AlreadyDownloaded(PathBuf),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for page writes
pub type WriteResult<T> = Result<T, WriteError>;

/// Persists the body of a downloaded page
///
/// Implementations must refuse to overwrite: writing the same URL twice fails
/// with [`WriteError::AlreadyDownloaded`].
pub trait PageWriter: Send + Sync {
    /// Writes `body` for `url`, returning where it was stored
    fn write(&self, url: &str, body: &[u8]) -> WriteResult<PathBuf>;
}
