//! Short key fingerprints for display.
//!
//! Listings and find output never show key material; they show a
//! truncated SHA-256 of the key instead, which is enough to tell two
//! keys for the same pair apart.

use sha2::{Digest, Sha256};

/// Hex digits of the digest kept for display.
const FINGERPRINT_LEN: usize = 12;

/// A truncated SHA-256 of the key, safe to print.
pub fn fingerprint(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let hex = format!("{:x}", digest);
    format!("sha256:{}", &hex[..FINGERPRINT_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        assert_eq!(fingerprint("secret1"), fingerprint("secret1"));
    }

    #[test]
    fn test_fingerprint_distinguishes_keys() {
        assert_ne!(fingerprint("secret1"), fingerprint("secret2"));
    }

    #[test]
    fn test_fingerprint_shape() {
        let fp = fingerprint("secret1");
        assert!(fp.starts_with("sha256:"));
        assert_eq!(fp.len(), "sha256:".len() + FINGERPRINT_LEN);
        assert!(fp["sha256:".len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_of_empty_key() {
        // total: even the empty string hashes to something printable
        assert!(fingerprint("").starts_with("sha256:"));
    }
}
