//! # Complaint Lifecycle
//!
//! Pending → InProgress → Solved. One stage at a time, never backward.
//! Solved is terminal for status; admin notes stay editable in every status.
//!
//! Every operation works on a snapshot and returns an updated copy, so a
//! rejected request never leaves a partially mutated complaint behind.

use crate::authz::DenyReason;
use crate::errors::{DomainError, Result};
use crate::models::{Complaint, ComplaintStatus, Role};

fn require_admin(role: Role) -> Result<()> {
    if role != Role::Admin {
        return Err(DomainError::Authz(DenyReason::RoleMismatch {
            required: Role::Admin,
            actual: role,
        }));
    }
    Ok(())
}

/// Validates a status change without touching any complaint.
pub fn check_transition(
    current: ComplaintStatus,
    requested: ComplaintStatus,
    role: Role,
) -> Result<()> {
    require_admin(role)?;
    if current.successor() != Some(requested) {
        return Err(DomainError::IllegalTransition {
            from: current,
            to: requested,
        });
    }
    Ok(())
}

pub fn transition(complaint: &Complaint, requested: ComplaintStatus, role: Role) -> Result<Complaint> {
    check_transition(complaint.status(), requested, role)?;
    let mut next = complaint.clone();
    next.set_status(requested);
    Ok(next)
}

/// Normalizes note text: trimmed, and blank means "no notes".
pub fn normalize_notes(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

pub fn set_notes(complaint: &Complaint, text: &str, role: Role) -> Result<Complaint> {
    require_admin(role)?;
    let mut next = complaint.clone();
    next.set_admin_notes(normalize_notes(text));
    Ok(next)
}
