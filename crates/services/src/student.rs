//! Student surface controller ("My Complaints").

use domains::{
    can_read_detail, stats::TopComplainer, Complaint, ComplaintId, DenyReason, DomainError,
    Principal, Result, Role, StoreError, Submission,
};
use tracing::{instrument, warn};

use crate::TriageService;

pub struct StudentDesk {
    service: TriageService,
    principal: Principal,
    complaints: Vec<Complaint>,
    top_complainer: Option<TopComplainer>,
}

impl StudentDesk {
    /// Gates the student surface, then loads the actor's own complaints and
    /// the "Most Complaints By" figure.
    pub async fn open(service: TriageService) -> Result<Self> {
        let principal = service.enter(Role::Student).await?;
        let complaints = service.list_own(&principal).await?;
        let top_complainer = service.top_complainer(&principal).await?;
        Ok(Self {
            service,
            principal,
            complaints,
            top_complainer,
        })
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn complaints(&self) -> &[Complaint] {
        &self.complaints
    }

    /// Whoever has filed the most complaints across the desk. Only the name
    /// and count; their complaints stay hidden.
    pub fn top_complainer(&self) -> Option<&TopComplainer> {
        self.top_complainer.as_ref()
    }

    /// Full detail of one complaint, subject to the owner-or-admin rule.
    pub fn complaint(&self, id: ComplaintId) -> Result<&Complaint> {
        let complaint = self
            .complaints
            .iter()
            .find(|c| c.id() == id)
            .ok_or(StoreError::NotFound(id))?;
        if !can_read_detail(&self.principal, complaint) {
            return Err(DomainError::Authz(DenyReason::NotOwner));
        }
        Ok(complaint)
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.complaints = self.service.list_own(&self.principal).await?;
        self.top_complainer = self.service.top_complainer(&self.principal).await?;
        Ok(())
    }

    /// Submits and re-fetches. A validation failure leaves the list as is.
    /// A failed re-fetch after a stored submission is logged, not returned.
    #[instrument(skip_all, fields(actor = %self.principal.id()))]
    pub async fn submit(&mut self, submission: &Submission) -> Result<Complaint> {
        let stored = self.service.submit(&self.principal, submission).await?;
        if let Err(error) = self.refresh().await {
            warn!(%error, complaint = %stored.id(), "refresh after submit failed");
        }
        Ok(stored)
    }

    pub async fn sign_out(self) -> Result<()> {
        self.service.sign_out().await
    }
}
