//! # Authorization Gate
//!
//! Decides whether the current actor may enter a surface. Evaluated before
//! any data belonging to other actors is fetched: it is a precondition,
//! not a filter over results.

use std::fmt;

use serde::Serialize;

use crate::errors::{DomainError, Result};
use crate::models::{Actor, ActorId, Complaint, Role};

/// Why an actor was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenyReason {
    NoSession,
    RoleMismatch { required: Role, actual: Role },
    /// The complaint belongs to another student.
    NotOwner,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NoSession => f.write_str("no active session"),
            DenyReason::RoleMismatch { required, actual } => {
                write!(f, "{required} role required, actor is {actual}")
            }
            DenyReason::NotOwner => f.write_str("complaint belongs to another student"),
        }
    }
}

/// An authorized actor, tagged by the surface it was admitted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", content = "actor", rename_all = "snake_case")]
pub enum Principal {
    Student(Actor),
    Admin(Actor),
}

impl Principal {
    pub fn actor(&self) -> &Actor {
        match self {
            Principal::Student(actor) | Principal::Admin(actor) => actor,
        }
    }

    pub fn id(&self) -> ActorId {
        self.actor().id
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::Student(_) => Role::Student,
            Principal::Admin(_) => Role::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow(Principal),
    Deny(DenyReason),
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow(_))
    }

    pub fn into_result(self) -> Result<Principal> {
        match self {
            Access::Allow(principal) => Ok(principal),
            Access::Deny(reason) => Err(DomainError::Authz(reason)),
        }
    }
}

/// `session` must carry the role resolved by the identity provider.
pub fn authorize(session: Option<&Actor>, required: Role) -> Access {
    let Some(actor) = session else {
        return Access::Deny(DenyReason::NoSession);
    };
    if actor.role != required {
        return Access::Deny(DenyReason::RoleMismatch {
            required,
            actual: actor.role,
        });
    }
    let actor = actor.clone();
    Access::Allow(match required {
        Role::Student => Principal::Student(actor),
        Role::Admin => Principal::Admin(actor),
    })
}

/// Full detail of a complaint is visible to its owner and to admins.
pub fn can_read_detail(principal: &Principal, complaint: &Complaint) -> bool {
    match principal {
        Principal::Admin(_) => true,
        Principal::Student(actor) => complaint.is_owned_by(actor.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Submission;
    use chrono::Utc;

    fn complaint_by(author: &Actor) -> Complaint {
        let valid = Submission::new("Mess food", "Food is cold every night", "Hostel")
            .validate()
            .unwrap();
        Complaint::submitted(author, valid, Utc::now())
    }

    #[test]
    fn no_session_is_denied() {
        assert_eq!(authorize(None, Role::Admin), Access::Deny(DenyReason::NoSession));
        assert_eq!(authorize(None, Role::Student), Access::Deny(DenyReason::NoSession));
    }

    #[test]
    fn role_mismatch_is_denied_both_ways() {
        let student = Actor::new("Sam", Role::Student);
        let admin = Actor::new("Ada", Role::Admin);

        assert_eq!(
            authorize(Some(&student), Role::Admin),
            Access::Deny(DenyReason::RoleMismatch {
                required: Role::Admin,
                actual: Role::Student
            })
        );
        assert!(!authorize(Some(&admin), Role::Student).is_allowed());
    }

    #[test]
    fn matching_role_yields_tagged_principal() {
        let admin = Actor::new("Ada", Role::Admin);
        match authorize(Some(&admin), Role::Admin) {
            Access::Allow(Principal::Admin(actor)) => assert_eq!(actor, admin),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn deny_converts_to_authz_error() {
        let err = authorize(None, Role::Admin).into_result().unwrap_err();
        assert_eq!(err, DomainError::Authz(DenyReason::NoSession));
        assert!(err.is_terminal_for_navigation());
    }

    #[test]
    fn students_read_only_their_own_detail() {
        let alice = Actor::new("Alice", Role::Student);
        let bob = Actor::new("Bob", Role::Student);
        let admin = Actor::new("Ada", Role::Admin);
        let complaint = complaint_by(&alice);

        assert!(can_read_detail(&Principal::Student(alice), &complaint));
        assert!(!can_read_detail(&Principal::Student(bob), &complaint));
        assert!(can_read_detail(&Principal::Admin(admin), &complaint));
    }

    #[test]
    fn not_owner_denial_keeps_the_navigation() {
        let err = DomainError::Authz(DenyReason::NotOwner);
        assert_eq!(err.to_string(), "unauthorized: complaint belongs to another student");
        assert!(!err.is_terminal_for_navigation());
    }
}
