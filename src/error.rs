//! Error taxonomy for store operations.
//!
//! Validation failures and persistence failures are separate variants so
//! the shell layer can report them differently. "No matching record" on
//! update/expire is not an error at all; those operations return
//! `Ok(false)` instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A required record field was empty on create/submit/update/expire.
    /// The store is left untouched.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The key file does not exist yet ("no store found").
    #[error("no key file found at {}", .path.display())]
    KeyfileMissing { path: PathBuf },

    /// The key file exists but could not be decoded.
    #[error("malformed key file {}: {source}", .path.display())]
    KeyfileMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Encoding the record collection for a flush failed.
    #[error("serialize key records: {0}")]
    Encode(#[source] serde_json::Error),

    /// Reading or writing the key file failed.
    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Refused to reload over unflushed in-memory changes.
    #[error("refusing to reload: unsaved changes have not been written")]
    DirtyReload,
}

pub type Result<T> = std::result::Result<T, StoreError>;
