//! Optional user configuration file model.

use serde::{Deserialize, Serialize};

/// Contents of `config.toml` in the default key directory. Every field
/// is optional; a missing file means defaults throughout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub store: StoreSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSection {
    /// Directory holding the key file.
    #[serde(default)]
    pub key_dir: Option<String>,
    /// Name of the key file inside the directory.
    #[serde(default)]
    pub key_file: Option<String>,
}
