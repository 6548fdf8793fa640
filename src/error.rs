//! Error types for gauthctl
//!
//! Store errors describe filesystem failures on a single state file. Refusals
//! are policy decisions and never touch the filesystem.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for state store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Filesystem-level failures of the state store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Username cannot be mapped to a path inside the state directory
    #[error("invalid username {name:?}: {reason}")]
    InvalidUsername { name: String, reason: &'static str },

    /// Read, write, open or sync failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config source failed mid-stream; nothing was installed
    #[error("reading config input failed: {source}")]
    ReadInput {
        #[source]
        source: io::Error,
    },

    /// A stale temporary file could not be removed before installing
    #[error("unable to pre-unlink temporary file {}: {source}", path.display())]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Another installer holds the temporary file; retry later
    #[error("another update is in progress ({} exists), try again", path.display())]
    Busy { path: PathBuf },

    /// The final rename over the state file failed; the old state is untouched
    #[error("replacing state file {} failed: {source}", path.display())]
    ReplaceFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Removing the state file failed for a reason other than absence
    #[error("unable to remove state file {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Policy refusals issued by the privilege gate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    /// The caller already has a state file
    #[error("2FA configuration exists for user {user}")]
    AlreadyEnabled { user: String },

    /// Only the superuser may disable 2FA
    #[error("only root is allowed to disable 2FA for user {target}")]
    NotSuperuser { target: String },

    /// The superuser has no self-service enrollment
    #[error("root cannot enable 2FA through gauthctl")]
    SuperuserEnable,
}

/// Everything that can end a dispatched command unsuccessfully
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("permission refused: {0}")]
    Refused(#[from] Refusal),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The config stream for `--enable` could not be opened
    #[error("unable to open config input: {0}")]
    Input(#[source] io::Error),
}

impl DispatchError {
    /// Whether the failure is a transient conflict the caller may retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Busy { .. }))
    }
}

/// Configuration loading failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("file_mode {mode:#o} grants group or other access")]
    PermissiveMode { mode: u32 },

    #[error("state_dir {} must be an absolute path", path.display())]
    RelativeStateDir { path: PathBuf },
}
