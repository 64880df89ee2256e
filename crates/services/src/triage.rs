//! # TriageService
//!
//! Orchestrates the gate, the lifecycle and the ports. Every mutation is a
//! single round trip to the store; callers re-fetch afterwards rather than
//! patching what they hold.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    authorize, lifecycle, stats, stats::TopComplainer, Access, Actor, Complaint, ComplaintStatus, ComplaintStore,
    DenyReason, DomainError, IdentityProvider, Principal, Result, Role, StoreError, Submission,
};
use tracing::{debug, info, instrument, warn};

/// State shared by the student and admin surfaces.
#[derive(Clone)]
pub struct TriageService {
    store: Arc<dyn ComplaintStore>,
    identity: Arc<dyn IdentityProvider>,
}

fn require(principal: &Principal, role: Role) -> Result<&Actor> {
    if principal.role() != role {
        return Err(DomainError::Authz(DenyReason::RoleMismatch {
            required: role,
            actual: principal.role(),
        }));
    }
    Ok(principal.actor())
}

impl TriageService {
    pub fn new(store: Arc<dyn ComplaintStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// The session actor with the role the identity provider vouches for,
    /// not whatever role the session object happens to carry.
    pub async fn resolve_session(&self) -> Result<Option<Actor>> {
        let Some(mut actor) = self.identity.current_session().await? else {
            return Ok(None);
        };
        actor.role = self.identity.role(actor.id).await?;
        Ok(Some(actor))
    }

    /// Gate for entering a surface. Must run before anything is fetched.
    ///
    /// A role mismatch on the admin surface ends the session before the
    /// error is returned.
    #[instrument(skip(self), fields(surface = %required))]
    pub async fn enter(&self, required: Role) -> Result<Principal> {
        let session = self.resolve_session().await?;
        match authorize(session.as_ref(), required) {
            Access::Allow(principal) => {
                debug!(actor = %principal.id(), "access granted");
                Ok(principal)
            }
            Access::Deny(reason) => {
                warn!(%reason, "access denied");
                if required == Role::Admin && reason != DenyReason::NoSession {
                    if let Err(error) = self.identity.sign_out().await {
                        warn!(%error, "sign-out after denied admin access failed");
                    }
                }
                Err(DomainError::Authz(reason))
            }
        }
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.identity.sign_out().await?;
        Ok(())
    }

    #[instrument(skip_all, fields(actor = %principal.id()))]
    pub async fn submit(&self, principal: &Principal, submission: &Submission) -> Result<Complaint> {
        let author = require(principal, Role::Student)?;
        let input = submission.validate().inspect_err(|error| {
            debug!(%error, "submission rejected");
        })?;
        let complaint = Complaint::submitted(author, input, Utc::now());
        let stored = self.store.create(complaint).await?;
        info!(complaint = %stored.id(), category = %stored.category(), "complaint submitted");
        Ok(stored)
    }

    pub async fn list_own(&self, principal: &Principal) -> Result<Vec<Complaint>> {
        let actor = require(principal, Role::Student)?;
        let complaints = self.store.list_by_owner(actor.id).await?;
        debug!(actor = %actor.id, count = complaints.len(), "fetched own complaints");
        Ok(complaints)
    }

    pub async fn list_all(&self, principal: &Principal) -> Result<Vec<Complaint>> {
        require(principal, Role::Admin)?;
        let complaints = self.store.list_all().await?;
        debug!(count = complaints.len(), "fetched all complaints");
        Ok(complaints)
    }

    /// The "Most Complaints By" figure on the student surface. Reads every
    /// complaint but hands back only the winning name and count.
    pub async fn top_complainer(&self, principal: &Principal) -> Result<Option<TopComplainer>> {
        require(principal, Role::Student)?;
        let complaints = self.store.list_all().await?;
        Ok(stats::top_complainer(&complaints))
    }

    /// Moves `complaint` one stage forward. `complaint` is the caller's
    /// current snapshot; an illegal request never reaches the store.
    ///
    /// The write is conditional on the stored status still matching the
    /// snapshot. If another admin moved the complaint in the meantime the
    /// request is judged against the stored status and refused.
    #[instrument(skip_all, fields(complaint = %complaint.id(), to = %requested))]
    pub async fn advance(
        &self,
        principal: &Principal,
        complaint: &Complaint,
        requested: ComplaintStatus,
    ) -> Result<Complaint> {
        let next = lifecycle::transition(complaint, requested, principal.role()).inspect_err(
            |error| warn!(%error, "transition rejected"),
        )?;
        let stored = self
            .store
            .update_status(next.id(), complaint.status(), next.status())
            .await
            .map_err(|error| match error {
                StoreError::StatusChanged { current, .. } => {
                    warn!(%current, "snapshot was stale, transition rejected");
                    DomainError::IllegalTransition {
                        from: current,
                        to: requested,
                    }
                }
                other => other.into(),
            })?;
        info!(from = %complaint.status(), "status updated");
        Ok(stored)
    }

    #[instrument(skip_all, fields(complaint = %complaint.id()))]
    pub async fn annotate(
        &self,
        principal: &Principal,
        complaint: &Complaint,
        text: &str,
    ) -> Result<Complaint> {
        let next = lifecycle::set_notes(complaint, text, principal.role())
            .inspect_err(|error| warn!(%error, "note edit rejected"))?;
        let stored = self
            .store
            .update_notes(next.id(), next.admin_notes().map(str::to_owned))
            .await?;
        info!(cleared = stored.admin_notes().is_none(), "admin notes updated");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockComplaintStore, MockIdentityProvider};
    use mockall::predicate::eq;

    fn svc(store: MockComplaintStore, identity: MockIdentityProvider) -> TriageService {
        TriageService::new(Arc::new(store), Arc::new(identity))
    }

    fn session_of(actor: &Actor, resolved: Role) -> MockIdentityProvider {
        let mut identity = MockIdentityProvider::new();
        let current = actor.clone();
        identity
            .expect_current_session()
            .returning(move || Ok(Some(current.clone())));
        identity.expect_role().returning(move |_| Ok(resolved));
        identity
    }

    fn filed_by(author: &Actor) -> Complaint {
        let input = Submission::new("Wifi down", "No wifi on floor 2", "Technical")
            .validate()
            .unwrap();
        Complaint::submitted(author, input, Utc::now())
    }

    #[tokio::test]
    async fn resolved_role_overrides_session_role() {
        // the session claims admin, the provider says student
        let claimant = Actor::new("Mallory", Role::Admin);
        let mut identity = session_of(&claimant, Role::Student);
        identity.expect_sign_out().times(1).returning(|| Ok(()));

        let err = svc(MockComplaintStore::new(), identity)
            .enter(Role::Admin)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Authz(DenyReason::RoleMismatch {
                required: Role::Admin,
                actual: Role::Student,
            })
        );
    }

    #[tokio::test]
    async fn admin_denial_signs_out_before_returning() {
        let student = Actor::new("Sam", Role::Student);
        let mut identity = session_of(&student, Role::Student);
        identity.expect_sign_out().times(1).returning(|| Ok(()));
        let mut store = MockComplaintStore::new();
        store.expect_list_all().never();

        let err = svc(store, identity).enter(Role::Admin).await.unwrap_err();
        assert!(err.is_terminal_for_navigation());
    }

    #[tokio::test]
    async fn failed_sign_out_does_not_mask_denial() {
        let student = Actor::new("Sam", Role::Student);
        let mut identity = session_of(&student, Role::Student);
        identity
            .expect_sign_out()
            .returning(|| Err(domains::IdentityError::Backend("offline".into())));

        let err = svc(MockComplaintStore::new(), identity)
            .enter(Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Authz(_)));
    }

    #[tokio::test]
    async fn no_session_is_denied_without_sign_out() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_current_session().returning(|| Ok(None));
        identity.expect_sign_out().never();

        let err = svc(MockComplaintStore::new(), identity)
            .enter(Role::Admin)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Authz(DenyReason::NoSession));
    }

    #[tokio::test]
    async fn student_denied_on_student_surface_keeps_session() {
        let admin = Actor::new("Ada", Role::Admin);
        let mut identity = session_of(&admin, Role::Admin);
        identity.expect_sign_out().never();

        let result = svc(MockComplaintStore::new(), identity).enter(Role::Student).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn submit_validates_before_touching_the_store() {
        let student = Actor::new("Sam", Role::Student);
        let mut store = MockComplaintStore::new();
        store.expect_create().never();
        let service = svc(store, MockIdentityProvider::new());

        let err = service
            .submit(&Principal::Student(student), &Submission::new("Hi", "short", "Hostel"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "title", .. }));
    }

    #[tokio::test]
    async fn submit_stores_a_pending_complaint() {
        let student = Actor::new("Sam", Role::Student);
        let mut store = MockComplaintStore::new();
        store.expect_create().times(1).returning(|c| Ok(c));
        let service = svc(store, MockIdentityProvider::new());

        let stored = service
            .submit(
                &Principal::Student(student.clone()),
                &Submission::new("Wifi down", "No wifi on floor 2", "Technical"),
            )
            .await
            .unwrap();
        assert_eq!(stored.status(), ComplaintStatus::Pending);
        assert_eq!(stored.author_id(), student.id);
        assert_eq!(stored.admin_notes(), None);
    }

    #[tokio::test]
    async fn admins_cannot_submit() {
        let admin = Actor::new("Ada", Role::Admin);
        let service = svc(MockComplaintStore::new(), MockIdentityProvider::new());
        let err = service
            .submit(
                &Principal::Admin(admin),
                &Submission::new("Wifi down", "No wifi on floor 2", "Technical"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Authz(_)));
    }

    #[tokio::test]
    async fn illegal_transition_never_reaches_the_store() {
        let admin = Principal::Admin(Actor::new("Ada", Role::Admin));
        let complaint = filed_by(&Actor::new("Sam", Role::Student));
        let mut store = MockComplaintStore::new();
        store.expect_update_status().never();

        let err = svc(store, MockIdentityProvider::new())
            .advance(&admin, &complaint, ComplaintStatus::Solved)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::IllegalTransition {
                from: ComplaintStatus::Pending,
                to: ComplaintStatus::Solved,
            }
        );
    }

    #[tokio::test]
    async fn legal_transition_is_persisted() {
        let admin = Principal::Admin(Actor::new("Ada", Role::Admin));
        let complaint = filed_by(&Actor::new("Sam", Role::Student));
        let expected = lifecycle::transition(&complaint, ComplaintStatus::InProgress, Role::Admin)
            .unwrap();
        let returned = expected.clone();

        let mut store = MockComplaintStore::new();
        store
            .expect_update_status()
            .with(
                eq(complaint.id()),
                eq(ComplaintStatus::Pending),
                eq(ComplaintStatus::InProgress),
            )
            .times(1)
            .returning(move |_, _, _| Ok(returned.clone()));

        let stored = svc(store, MockIdentityProvider::new())
            .advance(&admin, &complaint, ComplaintStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(stored, expected);
    }

    #[tokio::test]
    async fn store_failures_surface_unchanged() {
        let admin = Principal::Admin(Actor::new("Ada", Role::Admin));
        let complaint = filed_by(&Actor::new("Sam", Role::Student));
        let mut store = MockComplaintStore::new();
        store
            .expect_update_status()
            .times(1)
            .returning(|_, _, _| Err(StoreError::backend("connection reset")));

        let err = svc(store, MockIdentityProvider::new())
            .advance(&admin, &complaint, ComplaintStatus::InProgress)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Store(StoreError::backend("connection reset")));
    }

    #[tokio::test]
    async fn stale_snapshot_is_judged_against_the_stored_status() {
        let admin = Principal::Admin(Actor::new("Ada", Role::Admin));
        let complaint = filed_by(&Actor::new("Sam", Role::Student));
        let id = complaint.id();
        let mut store = MockComplaintStore::new();
        store.expect_update_status().times(1).returning(move |_, _, _| {
            Err(StoreError::StatusChanged {
                id,
                current: ComplaintStatus::Solved,
            })
        });

        let err = svc(store, MockIdentityProvider::new())
            .advance(&admin, &complaint, ComplaintStatus::InProgress)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::IllegalTransition {
                from: ComplaintStatus::Solved,
                to: ComplaintStatus::InProgress,
            }
        );
    }

    #[tokio::test]
    async fn notes_are_normalized_before_storing() {
        let admin = Principal::Admin(Actor::new("Ada", Role::Admin));
        let complaint = filed_by(&Actor::new("Sam", Role::Student));
        let returned = lifecycle::set_notes(&complaint, "Called the ISP", Role::Admin).unwrap();

        let mut store = MockComplaintStore::new();
        store
            .expect_update_notes()
            .with(eq(complaint.id()), eq(Some("Called the ISP".to_owned())))
            .times(1)
            .returning(move |_, _| Ok(returned.clone()));

        let stored = svc(store, MockIdentityProvider::new())
            .annotate(&admin, &complaint, "  Called the ISP \n")
            .await
            .unwrap();
        assert_eq!(stored.admin_notes(), Some("Called the ISP"));
    }

    #[tokio::test]
    async fn students_cannot_annotate() {
        let student = Actor::new("Sam", Role::Student);
        let complaint = filed_by(&student);
        let mut store = MockComplaintStore::new();
        store.expect_update_notes().never();

        let err = svc(store, MockIdentityProvider::new())
            .annotate(&Principal::Student(student), &complaint, "mine now")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Authz(_)));
    }

    #[test]
    fn list_all_requires_admin() {
        let student = Principal::Student(Actor::new("Sam", Role::Student));
        let mut store = MockComplaintStore::new();
        store.expect_list_all().never();
        let service = svc(store, MockIdentityProvider::new());

        let result = tokio_test::block_on(service.list_all(&student));
        assert!(matches!(result, Err(DomainError::Authz(_))));
    }

    #[tokio::test]
    async fn students_get_only_the_top_complainer() {
        let alice = Actor::new("Alice", Role::Student);
        let bob = Actor::new("Bob", Role::Student);
        let rows = vec![filed_by(&bob), filed_by(&alice), filed_by(&alice)];
        let mut store = MockComplaintStore::new();
        store.expect_list_all().times(1).returning(move || Ok(rows.clone()));

        let top = svc(store, MockIdentityProvider::new())
            .top_complainer(&Principal::Student(bob))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(top.display_name, "Alice");
        assert_eq!(top.author_id, alice.id);
        assert_eq!(top.count, 2);
    }

    #[tokio::test]
    async fn top_complainer_is_student_only() {
        let mut store = MockComplaintStore::new();
        store.expect_list_all().never();

        let err = svc(store, MockIdentityProvider::new())
            .top_complainer(&Principal::Admin(Actor::new("Ada", Role::Admin)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Authz(DenyReason::RoleMismatch { .. })));
    }
}
