//! Key directory helpers.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Create the key directory if needed and keep it private to the user.
///
/// Refuses to proceed when the path names an existing regular file, so a
/// misconfigured `--dir` cannot clobber one.
pub fn ensure_private_dir(path: &Path, mode: u32) -> Result<()> {
    if path.is_file() {
        bail!("{} exists and is not a directory", path.display());
    }
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("create directory {}", path.display()))?;
    }
    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(mode);
        fs::set_permissions(path, perm)
            .with_context(|| format!("set permissions {:o} on {}", mode, path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("keys");
        ensure_private_dir(&target, 0o700).unwrap();
        assert!(target.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_is_private() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("keys");
        ensure_private_dir(&target, 0o700).unwrap();
        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn test_refuses_to_clobber_a_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("keys");
        fs::write(&target, "not a directory").unwrap();
        assert!(ensure_private_dir(&target, 0o700).is_err());
        assert!(target.is_file());
    }

    #[test]
    fn test_existing_directory_is_accepted() {
        let dir = TempDir::new().unwrap();
        ensure_private_dir(dir.path(), 0o700).unwrap();
        ensure_private_dir(dir.path(), 0o700).unwrap();
    }
}
