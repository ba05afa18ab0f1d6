//! Local file-backed API key store.
//!
//! Keeps API keys in a single JSON file on disk, indexed in memory by
//! account and by service domain, so keys never have to be embedded in
//! code or environment variables. Keys are retired by expiration rather
//! than deletion, and every mutation is written through to the key file
//! before the call returns.
//!
//! ## Modules
//! - `cli` — Command-line handlers
//! - `core` — Store, domain normalization, persistence, path resolution
//! - `models` — Record and configuration data structures
//! - `util` — Filesystem and display helpers

pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod models;
pub mod util;

pub use crate::core::store::{KeyStore, StoreStatus};
pub use crate::error::StoreError;
pub use crate::models::record::{ListEntry, Record, RecordPatch};
