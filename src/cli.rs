use std::os::fd::RawFd;
use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::gate::Request;

#[derive(Parser, Debug)]
#[command(name = "gauthctl", version, about = "Manage secure gauth configs")]
#[command(group(
    ArgGroup::new("command")
        .required(true)
        .args(["enable", "disable", "status"])
))]
pub struct Args {
    /// Enable gauth using the config supplied on the input descriptor (fd 3)
    #[arg(long, short = 'e')]
    pub enable: bool,

    /// Disable gauth for the given user (root only)
    #[arg(long, short = 'd', value_name = "USERNAME")]
    pub disable: Option<String>,

    /// Check status of gauth for the current user (exit 0 = enabled, 1 = disabled)
    #[arg(long, short = 's')]
    pub status: bool,

    /// Path to configuration file
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read the new config from this descriptor instead of the configured one
    #[arg(long, value_name = "FD", requires = "enable")]
    pub input_fd: Option<RawFd>,
}

impl Args {
    pub fn request(&self) -> Request {
        if let Some(target) = &self.disable {
            Request::Disable {
                target: target.clone(),
            }
        } else if self.enable {
            Request::Enable
        } else {
            Request::Status
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("gauthctl").chain(args.iter().copied()))
    }

    #[test]
    fn test_each_command() {
        assert_eq!(parse(&["--enable"]).unwrap().request(), Request::Enable);
        assert_eq!(parse(&["-s"]).unwrap().request(), Request::Status);
        assert_eq!(
            parse(&["--disable", "bob"]).unwrap().request(),
            Request::Disable {
                target: "bob".to_string()
            }
        );
    }

    #[test]
    fn test_command_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--config", "/etc/gauthctl/gauthctl.toml"]).is_err());
    }

    #[test]
    fn test_commands_are_exclusive() {
        assert!(parse(&["--enable", "--status"]).is_err());
        assert!(parse(&["--disable", "bob", "--enable"]).is_err());
    }

    #[test]
    fn test_disable_needs_username() {
        assert!(parse(&["--disable"]).is_err());
    }

    #[test]
    fn test_input_fd_only_with_enable() {
        let args = parse(&["--enable", "--input-fd", "7"]).unwrap();
        assert_eq!(args.input_fd, Some(7));
        assert!(parse(&["--status", "--input-fd", "7"]).is_err());
    }

    #[test]
    fn test_rejects_positional_arguments() {
        assert!(parse(&["--status", "extra"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
