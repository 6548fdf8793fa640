//! Identity of the invoking user.
//!
//! Resolved once at startup from the real uid, then passed around as a plain
//! value so that authorization never queries the OS mid-flow.

use anyhow::{Context, Result};
use nix::unistd::{Uid, User, getuid};

/// Who is running the command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Login name from the passwd database
    pub name: String,
    /// Real uid is 0
    pub superuser: bool,
}

impl Identity {
    pub fn new(name: impl Into<String>, superuser: bool) -> Self {
        Self {
            name: name.into(),
            superuser,
        }
    }

    /// Resolve the real uid of this process
    pub fn current() -> Result<Self> {
        Self::from_uid(getuid())
    }

    pub fn from_uid(uid: Uid) -> Result<Self> {
        let user = User::from_uid(uid)
            .with_context(|| format!("Unable to look up uid {uid}"))?
            .with_context(|| format!("Unable to get username: no passwd entry for uid {uid}"))?;

        Ok(Self {
            name: user.name,
            superuser: uid.is_root(),
        })
    }
}
