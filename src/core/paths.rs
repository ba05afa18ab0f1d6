//! Key file location resolution.
//!
//! The store itself only consumes a resolved directory and file name;
//! the precedence policy lives here: CLI argument, then environment
//! variable, then the optional config file, then the hidden per-user
//! default directory.

use crate::constants;
use crate::models::config::ConfigFile;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Resolved location of the key file: a directory plus a file name.
#[derive(Debug, Clone)]
pub struct KeyfilePaths {
    pub dir: PathBuf,
    pub file_name: String,
}

impl KeyfilePaths {
    /// Resolve the key file location from CLI args, env vars, the
    /// optional config file, or defaults.
    pub fn resolve(dir_arg: Option<PathBuf>, file_arg: Option<String>) -> Result<Self> {
        let config = load_config();
        let dir = match dir_arg {
            Some(dir) => dir,
            None => match env::var(constants::ENV_KEY_DIR) {
                Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
                _ => match config.store.key_dir {
                    Some(dir) => PathBuf::from(dir),
                    None => default_dir()?,
                },
            },
        };
        let file_name = match file_arg {
            Some(name) => name,
            None => match env::var(constants::ENV_KEY_FILE) {
                Ok(name) if !name.is_empty() => name,
                _ => config
                    .store
                    .key_file
                    .unwrap_or_else(|| constants::KEY_FILE_DEFAULT.to_string()),
            },
        };
        Ok(Self { dir, file_name })
    }

    /// Full path to the key file.
    pub fn keyfile(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

impl std::fmt::Display for KeyfilePaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "keys@{}", self.keyfile().display())
    }
}

/// The hidden per-user directory: `$HOME` first, `$HOMEPATH` as the
/// Windows fallback.
fn default_dir() -> Result<PathBuf> {
    let home = env::var("HOME")
        .or_else(|_| env::var("HOMEPATH"))
        .context("neither HOME nor HOMEPATH is set; pass --dir")?;
    Ok(PathBuf::from(home).join(constants::KEY_DIR_DEFAULT))
}

/// Best-effort read of the optional config file. Malformed or unreadable
/// config degrades to defaults with a warning.
fn load_config() -> ConfigFile {
    let path = match default_dir() {
        Ok(dir) => dir.join(constants::CONFIG_FILE),
        Err(_) => return ConfigFile::default(),
    };
    if !path.exists() {
        return ConfigFile::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("warning: ignoring malformed {}: {}", path.display(), e);
                ConfigFile::default()
            }
        },
        Err(e) => {
            eprintln!("warning: cannot read {}: {}", path.display(), e);
            ConfigFile::default()
        }
    }
}
