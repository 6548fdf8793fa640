//! State file store.
//!
//! Installs, removes and probes a single state file. Installs go through a
//! sibling temporary file that is renamed over the target, so a reader opening
//! the state file sees either the previous content or the new content in full.
//!
//! The store knows nothing about users or privileges; callers decide which
//! paths it may touch.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use log::{debug, info, warn};

use super::path::temp_path;
use crate::error::{Result, StoreError};

/// Size of the buffer used to copy the config stream
pub const CHUNK_SIZE: usize = 4096;

/// Owner read/write only
pub const DEFAULT_FILE_MODE: u32 = 0o600;

/// Enrollment state encoded by the presence of a state file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrollment {
    Enabled,
    Disabled,
}

impl Enrollment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Enrollment::Enabled => "enabled",
            Enrollment::Disabled => "disabled",
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Enrollment::Enabled)
    }
}

impl fmt::Display for Enrollment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

enum StreamError {
    Read(io::Error),
    Write(io::Error),
}

/// Atomic install / idempotent remove over state file paths
#[derive(Debug, Clone)]
pub struct StateStore {
    mode: u32,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_MODE)
    }
}

impl StateStore {
    /// `mode` is applied when creating the temporary file; the process umask
    /// can only narrow it further
    pub fn new(mode: u32) -> Self {
        Self { mode }
    }

    /// Replace the state file at `path` with everything read from `source`.
    ///
    /// Returns the number of bytes installed. On any error the temporary file
    /// is removed and the existing state file, if any, is left as it was.
    pub fn install<R: Read + ?Sized>(&self, path: &Path, source: &mut R) -> Result<u64> {
        let tmp = temp_path(path);

        match fs::remove_file(&tmp) {
            Ok(()) => debug!("Removed stale temporary file {}", tmp.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(StoreError::CleanupFailed { path: tmp, source }),
        }

        // create_new: a concurrent installer that got here first wins
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(self.mode)
            .open(&tmp)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StoreError::Busy { path: tmp });
            }
            Err(source) => return Err(StoreError::io(tmp, source)),
        };

        let copied = copy_chunked(source, &mut file).and_then(|n| {
            file.sync_all().map_err(StreamError::Write)?;
            Ok(n)
        });
        drop(file);

        let written = match copied {
            Ok(n) => n,
            Err(StreamError::Read(source)) => {
                discard(&tmp);
                return Err(StoreError::ReadInput { source });
            }
            Err(StreamError::Write(source)) => {
                discard(&tmp);
                return Err(StoreError::io(tmp, source));
            }
        };

        if let Err(source) = fs::rename(&tmp, path) {
            discard(&tmp);
            return Err(StoreError::ReplaceFailed {
                path: path.to_path_buf(),
                source,
            });
        }

        info!("Installed state file {} ({} bytes)", path.display(), written);
        Ok(written)
    }

    /// Remove the state file. A missing file counts as success.
    pub fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                info!("Removed state file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("State file {} already absent", path.display());
                Ok(())
            }
            Err(source) => Err(StoreError::Remove {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Report whether a state file is present, without reading it.
    ///
    /// Only "not found" maps to `Disabled`; a lookup that fails for any other
    /// reason is an error rather than a guess.
    pub fn probe(&self, path: &Path) -> Result<Enrollment> {
        match fs::symlink_metadata(path) {
            Ok(_) => Ok(Enrollment::Enabled),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Enrollment::Disabled),
            Err(source) => Err(StoreError::io(path, source)),
        }
    }

    pub fn exists(&self, path: &Path) -> bool {
        matches!(self.probe(path), Ok(Enrollment::Enabled))
    }
}

fn copy_chunked<R: Read + ?Sized, W: Write>(
    source: &mut R,
    sink: &mut W,
) -> std::result::Result<u64, StreamError> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::Read(e)),
        };
        sink.write_all(&buf[..n]).map_err(StreamError::Write)?;
        total += n as u64;
    }
}

/// Best-effort removal of an abandoned temporary file
fn discard(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!("Failed to remove temporary file {}: {}", tmp.display(), e);
    }
}
