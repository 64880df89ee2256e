//! In-process identity directory with a single session slot.

use async_trait::async_trait;
use dashmap::DashMap;
use domains::{Actor, ActorId, IdentityError, IdentityProvider, Role};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Known actors plus the one session currently attached to this process.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    actors: DashMap<ActorId, Actor>,
    current: RwLock<Option<ActorId>>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actors(actors: impl IntoIterator<Item = Actor>) -> Self {
        let directory = Self::new();
        for actor in actors {
            directory.register(actor);
        }
        directory
    }

    /// Adds or replaces an actor. Replacing changes the role future
    /// lookups report, even for an attached session.
    pub fn register(&self, actor: Actor) {
        self.actors.insert(actor.id, actor);
    }

    pub fn lookup(&self, id: ActorId) -> Option<Actor> {
        self.actors.get(&id).map(|entry| entry.value().clone())
    }

    /// Binds an already-issued session to this process.
    pub async fn attach(&self, id: ActorId) -> Result<Actor, IdentityError> {
        let actor = self.lookup(id).ok_or(IdentityError::UnknownActor(id))?;
        *self.current.write().await = Some(id);
        info!(actor = %id, role = %actor.role, "session attached");
        Ok(actor)
    }
}

#[async_trait]
impl IdentityProvider for SessionDirectory {
    async fn current_session(&self) -> Result<Option<Actor>, IdentityError> {
        let current = *self.current.read().await;
        Ok(current.and_then(|id| self.lookup(id)))
    }

    async fn role(&self, actor_id: ActorId) -> Result<Role, IdentityError> {
        self.actors
            .get(&actor_id)
            .map(|entry| entry.role)
            .ok_or(IdentityError::UnknownActor(actor_id))
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        if let Some(id) = self.current.write().await.take() {
            debug!(actor = %id, "session cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_session_until_attached() {
        let alice = Actor::new("Alice", Role::Student);
        let dir = SessionDirectory::with_actors([alice.clone()]);
        assert_eq!(dir.current_session().await.unwrap(), None);

        dir.attach(alice.id).await.unwrap();
        assert_eq!(dir.current_session().await.unwrap(), Some(alice));
    }

    #[tokio::test]
    async fn attaching_an_unknown_actor_fails() {
        let dir = SessionDirectory::new();
        let ghost = ActorId::new();
        assert_eq!(dir.attach(ghost).await, Err(IdentityError::UnknownActor(ghost)));
        assert_eq!(dir.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn role_reflects_the_latest_registration() {
        let mut carol = Actor::new("Carol", Role::Admin);
        let dir = SessionDirectory::with_actors([carol.clone()]);
        assert_eq!(dir.role(carol.id).await.unwrap(), Role::Admin);

        carol.role = Role::Student;
        dir.register(carol.clone());
        assert_eq!(dir.role(carol.id).await.unwrap(), Role::Student);
        assert!(matches!(
            dir.role(ActorId::new()).await,
            Err(IdentityError::UnknownActor(_))
        ));
    }

    #[tokio::test]
    async fn sign_out_clears_and_is_idempotent() {
        let bob = Actor::new("Bob", Role::Student);
        let dir = SessionDirectory::with_actors([bob.clone()]);
        dir.attach(bob.id).await.unwrap();

        dir.sign_out().await.unwrap();
        assert_eq!(dir.current_session().await.unwrap(), None);
        dir.sign_out().await.unwrap();
    }
}
