//! # Ports
//!
//! The two external collaborators the core consumes. Any adapter must
//! implement these traits to be wired into the services.
//!
//! Each port exposes a typed error so adapters map their failures into
//! predictable variants instead of returning `anyhow::Result`.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Actor, ActorId, Complaint, ComplaintId, ComplaintStatus, Role};

/// Failures surfaced by [`ComplaintStore`] adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("complaint {0} not found")]
    NotFound(ComplaintId),

    #[error("complaint {0} already exists")]
    Conflict(ComplaintId),

    /// Conditional status write lost: the stored status is no longer the
    /// one the caller expected.
    #[error("complaint {id} is now {current}")]
    StatusChanged {
        id: ComplaintId,
        current: ComplaintStatus,
    },

    /// Connection, query or decoding failure in the backing store
    #[error("complaint store failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Failures surfaced by [`IdentityProvider`] adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("actor {0} is not known to the identity provider")]
    UnknownActor(ActorId),

    #[error("identity provider failure: {0}")]
    Backend(String),
}

/// Session and role lookups. Minting and validating sessions happens
/// behind this trait and is not the core's concern.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The actor bound to the current session, if any.
    async fn current_session(&self) -> Result<Option<Actor>, IdentityError>;

    /// Authoritative role for an actor.
    async fn role(&self, actor_id: ActorId) -> Result<Role, IdentityError>;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<(), IdentityError>;
}

/// Durable complaint storage. The store is the single source of truth;
/// callers re-fetch after every mutation instead of patching local copies.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    async fn create(&self, complaint: Complaint) -> Result<Complaint, StoreError>;

    /// Complaints owned by `actor_id`, in submission order.
    async fn list_by_owner(&self, actor_id: ActorId) -> Result<Vec<Complaint>, StoreError>;

    /// Every complaint, in submission order.
    async fn list_all(&self) -> Result<Vec<Complaint>, StoreError>;

    /// Sets the status only while the stored status still equals `expected`.
    /// Otherwise fails with [`StoreError::StatusChanged`] and writes nothing.
    async fn update_status(
        &self,
        id: ComplaintId,
        expected: ComplaintStatus,
        status: ComplaintStatus,
    ) -> Result<Complaint, StoreError>;

    /// `None` clears the notes.
    async fn update_notes(
        &self,
        id: ComplaintId,
        notes: Option<String>,
    ) -> Result<Complaint, StoreError>;
}
