//! # In-memory ComplaintStore
//!
//! Process-local store backed by a `DashMap`. Used by tests, the seeder and
//! the `memory` storage backend. Contents vanish with the process.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{
    ActorId, Complaint, ComplaintId, ComplaintRecord, ComplaintStatus, ComplaintStore, StoreError,
};
use tracing::trace;

#[derive(Debug, Default)]
pub struct InMemoryComplaintStore {
    rows: DashMap<ComplaintId, Complaint>,
}

impl InMemoryComplaintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_complaints(complaints: impl IntoIterator<Item = Complaint>) -> Self {
        let rows = complaints.into_iter().map(|c| (c.id(), c)).collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Submission order: oldest first, id as tie-breaker.
    fn ordered(&self, keep: impl Fn(&Complaint) -> bool) -> Vec<Complaint> {
        let mut out: Vec<Complaint> = self
            .rows
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        out.sort_by_key(|c| (c.created_at(), c.id()));
        out
    }

    fn rewrite(
        &self,
        id: ComplaintId,
        edit: impl FnOnce(&mut ComplaintRecord) -> Result<(), StoreError>,
    ) -> Result<Complaint, StoreError> {
        // the shard stays write-locked from check to write
        let mut slot = self.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let mut record = ComplaintRecord::from(slot.value().clone());
        edit(&mut record)?;
        *slot = Complaint::from(record);
        Ok(slot.value().clone())
    }
}

#[async_trait]
impl ComplaintStore for InMemoryComplaintStore {
    async fn create(&self, complaint: Complaint) -> Result<Complaint, StoreError> {
        match self.rows.entry(complaint.id()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(complaint.id())),
            Entry::Vacant(slot) => {
                slot.insert(complaint.clone());
                trace!(complaint = %complaint.id(), "inserted");
                Ok(complaint)
            }
        }
    }

    async fn list_by_owner(&self, actor_id: ActorId) -> Result<Vec<Complaint>, StoreError> {
        Ok(self.ordered(|c| c.is_owned_by(actor_id)))
    }

    async fn list_all(&self) -> Result<Vec<Complaint>, StoreError> {
        Ok(self.ordered(|_| true))
    }

    async fn update_status(
        &self,
        id: ComplaintId,
        expected: ComplaintStatus,
        status: ComplaintStatus,
    ) -> Result<Complaint, StoreError> {
        self.rewrite(id, |r| {
            if r.status != expected {
                return Err(StoreError::StatusChanged { id, current: r.status });
            }
            r.status = status;
            Ok(())
        })
    }

    async fn update_notes(
        &self,
        id: ComplaintId,
        notes: Option<String>,
    ) -> Result<Complaint, StoreError> {
        self.rewrite(id, |r| {
            r.admin_notes = notes;
            Ok(())
        })
    }
}
