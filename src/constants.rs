//! Centralized constants for file names, locations, and limits.

/// Default name of the key file on disk.
pub const KEY_FILE_DEFAULT: &str = "access_keys.json";

/// Default hidden directory under the user's home holding the key file.
pub const KEY_DIR_DEFAULT: &str = ".apikey_manager";

/// Name of the optional configuration file inside the key directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the key file directory.
pub const ENV_KEY_DIR: &str = "APIKEY_VAULT_DIR";

/// Environment variable overriding the key file name.
pub const ENV_KEY_FILE: &str = "APIKEY_VAULT_FILE";

/// Permission mode for the key file directory.
pub const KEY_DIR_MODE: u32 = 0o700;

/// Permission mode for the key file.
pub const KEY_FILE_MODE: u32 = 0o600;

/// Maximum accepted key size in bytes.
pub const MAX_KEY_SIZE: usize = 65_536;

/// Record fields managed by the store; `set` refuses to touch these.
pub const PROTECTED_FIELDS: &[&str] = &[
    "key",
    "account",
    "domain",
    "created_at",
    "updated_at",
    "expired",
];

/// Timestamp format used in the key file (local time, second precision).
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
