//! gauthctl library
//!
//! Manages per-user 2FA state files: a user's config is installed atomically
//! into a protected directory, removed by the superuser, and its presence
//! reported as the user's enrollment status.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod identity;
pub mod state;

pub use config::GauthConfig;
pub use dispatch::{Dispatcher, Outcome};
pub use error::{ConfigError, DispatchError, Refusal, StoreError};
pub use gate::{Action, ActionKind, Request, authorize};
pub use identity::Identity;
pub use state::{Enrollment, StateStore};
