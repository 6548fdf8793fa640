//! Command dispatcher.
//!
//! Runs an authorized request against the state store and reports what
//! happened. Refusals from the gate and the "already enabled" guard are
//! returned before any file is touched.

use std::io::{self, Read};
use std::path::PathBuf;

use log::info;

use crate::error::{DispatchError, Refusal};
use crate::gate::{self, ActionKind, Request};
use crate::identity::Identity;
use crate::state::{Enrollment, StateStore, derive_path};

/// Successful result of a dispatched command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new config was installed for `user`
    Enabled { user: String, bytes: u64 },
    /// `user` has no config any more
    Disabled { user: String },
    /// Enrollment of the caller
    Status { user: String, enrollment: Enrollment },
}

impl Outcome {
    /// 0 on success; `status` additionally reports "disabled" as 1
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Status {
                enrollment: Enrollment::Disabled,
                ..
            } => 1,
            _ => 0,
        }
    }

    /// Human-readable notice for the terminal
    pub fn message(&self) -> String {
        match self {
            Outcome::Enabled { .. } => "GAuth set up successfully".to_string(),
            Outcome::Disabled { .. } => "GAuth disabled successfully".to_string(),
            Outcome::Status { user, enrollment } => {
                format!("2FA is {enrollment} for user {user}")
            }
        }
    }
}

/// Ties the state directory to a store and executes requests
#[derive(Debug, Clone)]
pub struct Dispatcher {
    state_dir: PathBuf,
    store: StateStore,
}

impl Dispatcher {
    pub fn new(state_dir: impl Into<PathBuf>, store: StateStore) -> Self {
        Self {
            state_dir: state_dir.into(),
            store,
        }
    }

    /// Authorize and execute `request` on behalf of `identity`.
    ///
    /// `open_input` is only called for an enable that passed every check, so
    /// the config stream is never consumed by a refused request.
    pub fn run<R, F>(
        &self,
        identity: &Identity,
        request: &Request,
        open_input: F,
    ) -> Result<Outcome, DispatchError>
    where
        R: Read,
        F: FnOnce() -> io::Result<R>,
    {
        let action = gate::authorize(identity, request)?;
        let user = action.user().to_string();
        let path = derive_path(&self.state_dir, &user)?;

        match action.kind() {
            ActionKind::EnableSelf => {
                if self.store.probe(&path)?.is_enabled() {
                    return Err(Refusal::AlreadyEnabled { user }.into());
                }
                let mut input = open_input().map_err(DispatchError::Input)?;
                let bytes = self.store.install(&path, &mut input)?;
                Ok(Outcome::Enabled { user, bytes })
            }
            ActionKind::DisableUser => {
                self.store.remove(&path)?;
                Ok(Outcome::Disabled { user })
            }
            ActionKind::StatusSelf => {
                info!("Checking existence of {}", path.display());
                let enrollment = self.store.probe(&path)?;
                Ok(Outcome::Status { user, enrollment })
            }
        }
    }
}
