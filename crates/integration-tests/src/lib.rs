//! Shared fixtures: a desk wired to the real in-memory adapters.

use std::sync::Arc;

use auth_adapters::SessionDirectory;
use chrono::{DateTime, Duration, TimeZone, Utc};
use domains::{
    Actor, Category, Complaint, ComplaintId, ComplaintRecord, ComplaintStatus, ComplaintStore,
    Role,
};
use services::TriageService;
use storage_adapters::InMemoryComplaintStore;

pub struct Desk {
    pub store: Arc<InMemoryComplaintStore>,
    pub directory: Arc<SessionDirectory>,
    pub service: TriageService,
    pub alice: Actor,
    pub bob: Actor,
    pub dana: Actor,
}

impl Desk {
    /// Two students (Alice, Bob), one admin (Dana), empty store, no session.
    pub fn new() -> Self {
        let alice = Actor::new("Alice", Role::Student);
        let bob = Actor::new("Bob", Role::Student);
        let dana = Actor::new("Dana", Role::Admin);
        let store = Arc::new(InMemoryComplaintStore::new());
        let directory = Arc::new(SessionDirectory::with_actors([
            alice.clone(),
            bob.clone(),
            dana.clone(),
        ]));
        let service = TriageService::new(store.clone(), directory.clone());
        Self {
            store,
            directory,
            service,
            alice,
            bob,
            dana,
        }
    }

    /// Attaches `actor`'s session and returns a service handle for it.
    pub async fn as_actor(&self, actor: &Actor) -> TriageService {
        self.directory
            .attach(actor.id)
            .await
            .unwrap_or_else(|e| panic!("fixture actor must be registered: {e}"));
        self.service.clone()
    }
}

impl Default for Desk {
    fn default() -> Self {
        Self::new()
    }
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A stored-shape complaint, `minute` minutes after a fixed epoch.
pub fn complaint(
    author: &Actor,
    title: &str,
    category: Category,
    status: ComplaintStatus,
    minute: i64,
) -> Complaint {
    Complaint::from(ComplaintRecord {
        id: ComplaintId::new(),
        author_id: author.id,
        author_name: author.display_name.clone(),
        title: title.to_string(),
        description: "Enough words to pass validation.".to_string(),
        category,
        status,
        created_at: epoch() + Duration::minutes(minute),
        admin_notes: None,
    })
}

/// Inserts through the port, the way an adapter contract sees it.
pub async fn insert_all(store: &dyn ComplaintStore, complaints: &[Complaint]) {
    for c in complaints {
        if let Err(e) = store.create(c.clone()).await {
            panic!("fixture insert failed: {e}");
        }
    }
}
