//! Privilege gate.
//!
//! Turns a requested command into an [`Action`] the dispatcher may execute,
//! or a [`Refusal`]. Decisions depend only on the caller's [`Identity`] and
//! the request. `Action` can only be built here, so an unauthorized
//! transition cannot reach the state store.

use crate::error::Refusal;
use crate::identity::Identity;

/// What the caller asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Install a new config for the caller
    Enable,
    /// Remove the config of `target`
    Disable { target: String },
    /// Report whether the caller has a config
    Status,
}

/// An authorized operation, tied to the user whose state file it touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    kind: ActionKind,
    user: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Caller enrolling themselves
    EnableSelf,
    /// Superuser removing someone's enrollment
    DisableUser,
    /// Caller inspecting their own enrollment
    StatusSelf,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// User whose state file the action operates on
    pub fn user(&self) -> &str {
        &self.user
    }
}

/// Decide whether `identity` may perform `request`
pub fn authorize(identity: &Identity, request: &Request) -> Result<Action, Refusal> {
    let (kind, user) = match request {
        Request::Enable if identity.superuser => return Err(Refusal::SuperuserEnable),
        Request::Enable => (ActionKind::EnableSelf, identity.name.clone()),
        Request::Disable { target } if !identity.superuser => {
            return Err(Refusal::NotSuperuser {
                target: target.clone(),
            });
        }
        Request::Disable { target } => (ActionKind::DisableUser, target.clone()),
        Request::Status => (ActionKind::StatusSelf, identity.name.clone()),
    };

    log::debug!("Authorized {:?} on {} for {}", kind, user, identity.name);
    Ok(Action { kind, user })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity::new("alice", false)
    }

    fn root() -> Identity {
        Identity::new("root", true)
    }

    #[test]
    fn test_self_enable_targets_own_name() {
        let action = authorize(&alice(), &Request::Enable).unwrap();
        assert_eq!(action.kind(), ActionKind::EnableSelf);
        assert_eq!(action.user(), "alice");
    }

    #[test]
    fn test_superuser_cannot_enable() {
        assert_eq!(
            authorize(&root(), &Request::Enable),
            Err(Refusal::SuperuserEnable)
        );
    }

    #[test]
    fn test_disable_requires_superuser() {
        for target in ["bob", "alice", "root"] {
            let request = Request::Disable {
                target: target.to_string(),
            };
            assert_eq!(
                authorize(&alice(), &request),
                Err(Refusal::NotSuperuser {
                    target: target.to_string()
                })
            );
        }
    }

    #[test]
    fn test_superuser_disables_target() {
        let request = Request::Disable {
            target: "bob".to_string(),
        };
        let action = authorize(&root(), &request).unwrap();
        assert_eq!(action.kind(), ActionKind::DisableUser);
        assert_eq!(action.user(), "bob");
    }

    #[test]
    fn test_status_is_always_own_file() {
        for identity in [alice(), root()] {
            let action = authorize(&identity, &Request::Status).unwrap();
            assert_eq!(action.kind(), ActionKind::StatusSelf);
            assert_eq!(action.user(), identity.name);
        }
    }
}
