//! Errors raised at the persistence boundary.
//!
//! The feed itself never fails; only loading and saving do.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Reading or writing a feed file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored feed could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type FeedResult<T> = Result<T, FeedError>;
