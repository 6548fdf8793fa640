use std::fs;
use std::io;
use std::os::fd::RawFd;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::DEFAULT_FILE_MODE;
use crate::state::input::DEFAULT_INPUT_FD;

/// System-wide configuration file, read when present
pub const SYSTEM_CONFIG_PATH: &str = "/etc/gauthctl/gauthctl.toml";

/// State directory baked in at build time (`GAUTH_STATEDIR`), else the FHS default
pub const DEFAULT_STATE_DIR: &str = match option_env!("GAUTH_STATEDIR") {
    Some(dir) => dir,
    None => "/var/lib/gauth",
};

/// On-disk TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GauthConfig {
    /// Directory holding one state file per user
    pub state_dir: PathBuf,
    /// Permission bits for new state files
    pub file_mode: u32,
    /// Descriptor the new config is read from on `--enable`
    pub input_fd: RawFd,
}

impl Default for GauthConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            file_mode: DEFAULT_FILE_MODE,
            input_fd: DEFAULT_INPUT_FD,
        }
    }
}

impl GauthConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the system config is used if
    /// present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path,
            None => Path::new(SYSTEM_CONFIG_PATH),
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        log::debug!("Using config from: {}", path.display());
        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_mode & 0o077 != 0 || self.file_mode & !0o777 != 0 {
            return Err(ConfigError::PermissiveMode {
                mode: self.file_mode,
            });
        }
        if !self.state_dir.is_absolute() {
            return Err(ConfigError::RelativeStateDir {
                path: self.state_dir.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GauthConfig::default();
        assert_eq!(config.file_mode, 0o600);
        assert_eq!(config.input_fd, 3);
        assert!(config.state_dir.is_absolute());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_uses_defaults() {
        let config = GauthConfig::parse("state_dir = \"/srv/gauth\"\n").unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/srv/gauth"));
        assert_eq!(config.file_mode, 0o600);
        assert_eq!(config.input_fd, 3);
    }

    #[test]
    fn test_parse_rejects_group_readable_mode() {
        let err = GauthConfig::parse("file_mode = 0o640\n").unwrap_err();
        assert!(matches!(err, ConfigError::PermissiveMode { mode: 0o640 }));
    }

    #[test]
    fn test_parse_accepts_read_only_mode() {
        let config = GauthConfig::parse("file_mode = 0o400\n").unwrap();
        assert_eq!(config.file_mode, 0o400);
    }

    #[test]
    fn test_parse_rejects_relative_state_dir() {
        let err = GauthConfig::parse("state_dir = \"gauth\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::RelativeStateDir { .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(matches!(
            GauthConfig::parse("statedir = \"/srv\"\n"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gauthctl.toml");
        fs::write(&path, "input_fd = 5\n").unwrap();

        let config = GauthConfig::load(Some(&path)).unwrap();

        assert_eq!(config.input_fd, 5);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = GauthConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_serialized_default_round_trips() {
        let text = toml::to_string_pretty(&GauthConfig::default()).unwrap();
        assert_eq!(GauthConfig::parse(&text).unwrap(), GauthConfig::default());
    }
}
