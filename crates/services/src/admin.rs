//! Admin surface controller.
//!
//! Owns the view state explicitly: the last fetched snapshot plus the search
//! inputs. Visible rows and summary cards are derived from the snapshot on
//! demand and never cached.

use domains::{
    search, stats, Complaint, ComplaintId, ComplaintStatus, DashboardSummary, Principal, Result,
    Role, StatusFilter, StoreError,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::TriageService;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminViewState {
    complaints: Vec<Complaint>,
    pub query: String,
    pub status_filter: StatusFilter,
}

impl AdminViewState {
    pub fn new(complaints: Vec<Complaint>) -> Self {
        Self {
            complaints,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> &[Complaint] {
        &self.complaints
    }

    pub fn find(&self, id: ComplaintId) -> Option<&Complaint> {
        self.complaints.iter().find(|c| c.id() == id)
    }

    /// Rows for the complaints table.
    pub fn visible(&self) -> Vec<&Complaint> {
        search::filter(&self.complaints, &self.query, &self.status_filter)
    }

    /// Header and summary cards. Always over the full snapshot, not the
    /// filtered rows.
    pub fn summary(&self) -> DashboardSummary {
        stats::summarize(&self.complaints)
    }

    fn replace(&mut self, complaints: Vec<Complaint>) {
        self.complaints = complaints;
    }
}

pub struct AdminConsole {
    service: TriageService,
    principal: Principal,
    state: AdminViewState,
}

impl AdminConsole {
    /// Gates the admin surface, then loads the full collection.
    pub async fn open(service: TriageService) -> Result<Self> {
        let principal = service.enter(Role::Admin).await?;
        let complaints = service.list_all(&principal).await?;
        Ok(Self {
            service,
            principal,
            state: AdminViewState::new(complaints),
        })
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn state(&self) -> &AdminViewState {
        &self.state
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.state.status_filter = filter;
    }

    pub async fn refresh(&mut self) -> Result<()> {
        let complaints = self.service.list_all(&self.principal).await?;
        debug!(count = complaints.len(), "admin view refreshed");
        self.state.replace(complaints);
        Ok(())
    }

    fn current(&self, id: ComplaintId) -> Result<Complaint> {
        self.state
            .find(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id).into())
    }

    /// Re-fetches after a mutation that already landed. A failure here keeps
    /// the old snapshot and is only logged, so the caller still sees the write.
    async fn refresh_after(&mut self, updated: &Complaint) {
        if let Err(error) = self.refresh().await {
            warn!(%error, complaint = %updated.id(), "refresh after mutation failed");
        }
    }

    /// Advances a complaint and re-fetches the whole collection on success.
    /// On failure the view is left exactly as it was.
    pub async fn advance(&mut self, id: ComplaintId, requested: ComplaintStatus) -> Result<Complaint> {
        let current = self.current(id)?;
        let updated = self.service.advance(&self.principal, &current, requested).await?;
        self.refresh_after(&updated).await;
        Ok(updated)
    }

    pub async fn annotate(&mut self, id: ComplaintId, text: &str) -> Result<Complaint> {
        let current = self.current(id)?;
        let updated = self.service.annotate(&self.principal, &current, text).await?;
        self.refresh_after(&updated).await;
        Ok(updated)
    }

    pub async fn sign_out(self) -> Result<()> {
        self.service.sign_out().await
    }
}
