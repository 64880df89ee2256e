//! # DomainError
//!
//! Centralized error handling for the complaint desk.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

use crate::authz::DenyReason;
use crate::models::ComplaintStatus;
use crate::ports::{IdentityError, StoreError};

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bad submission input. The user corrects the field and resubmits.
    #[error("validation error: {field} {constraint}")]
    Validation {
        field: &'static str,
        constraint: String,
    },

    /// The actor may not enter this surface or perform this operation.
    #[error("unauthorized: {0}")]
    Authz(DenyReason),

    /// The requested status is not the successor of the current one.
    /// Nothing was written.
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition {
        from: ComplaintStatus,
        to: ComplaintStatus,
    },

    /// Persistence or network failure. Not retried automatically.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Identity provider failure (session lookup, role resolution, sign-out).
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl DomainError {
    pub fn validation(field: &'static str, constraint: impl Into<String>) -> Self {
        Self::Validation {
            field,
            constraint: constraint.into(),
        }
    }

    /// Surface denials end the current navigation; everything else, including
    /// a refused detail read, can be retried.
    pub fn is_terminal_for_navigation(&self) -> bool {
        matches!(
            self,
            Self::Authz(DenyReason::NoSession | DenyReason::RoleMismatch { .. })
        )
    }
}

/// A specialized Result type for complaint desk logic.
pub type Result<T> = std::result::Result<T, DomainError>;
