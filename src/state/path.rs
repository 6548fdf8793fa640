//! Username to state-file path mapping.
//!
//! Every state file lives directly inside the state directory and is named
//! exactly after its user. Names that could leave the directory, or that
//! would collide with an in-flight temporary file, are rejected up front.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// Suffix of the sibling file an install streams into before the rename
pub const TEMP_SUFFIX: &str = ".new";

/// Check that `username` names a plain file inside the state directory
pub fn validate_username(username: &str) -> Result<()> {
    let reason = if username.is_empty() {
        Some("empty")
    } else if username.contains('/') {
        Some("contains a path separator")
    } else if username.contains('\0') {
        Some("contains a NUL byte")
    } else if username.starts_with('.') {
        Some("starts with '.'")
    } else if username.ends_with(TEMP_SUFFIX) {
        Some("ends with the temporary file suffix")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StoreError::InvalidUsername {
            name: username.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Derive `<state_dir>/<username>`
pub fn derive_path(state_dir: &Path, username: &str) -> Result<PathBuf> {
    validate_username(username)?;
    Ok(state_dir.join(username))
}

/// Sibling temporary path `<path>.new`, in the same directory so the final
/// rename stays on one filesystem
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_path_joins_username() {
        let path = derive_path(Path::new("/var/lib/gauth"), "alice").unwrap();
        assert_eq!(path, PathBuf::from("/var/lib/gauth/alice"));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let path = PathBuf::from("/var/lib/gauth/alice");
        let tmp = temp_path(&path);
        assert_eq!(tmp, PathBuf::from("/var/lib/gauth/alice.new"));
        assert_eq!(tmp.parent(), path.parent());
    }

    #[test]
    fn test_rejects_traversal() {
        for name in ["", ".", "..", "../etc/shadow", "a/b", "/root", ".hidden", "bob.new", "x\0y"] {
            let err = derive_path(Path::new("/var/lib/gauth"), name).unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidUsername { .. }),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_accepts_ordinary_names() {
        for name in ["root", "alice", "svc-backup", "j.doe", "user_01"] {
            assert!(validate_username(name).is_ok(), "{name:?} should be accepted");
        }
    }
}
