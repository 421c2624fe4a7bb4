use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::identity::errors::RepositoryError;
use crate::identity::errors::UniqueField;
use crate::identity::models::Identity;
use crate::identity::models::IdentityId;
use crate::identity::models::IdentityUuid;
use crate::identity::models::Metadata;
use crate::identity::models::NewIdentity;
use crate::identity::models::Username;
use crate::identity::ports::IdentityRepository;

/// Process-local identity store for development and tests.
///
/// Uniqueness checks and the insert happen under one write lock, so
/// concurrent registrations behave like the database constraints.
#[derive(Default)]
pub struct InMemoryIdentityRepository {
    inner: RwLock<Identities>,
}

#[derive(Default)]
struct Identities {
    next_id: i64,
    by_uuid: HashMap<IdentityUuid, Identity>,
}

impl Identities {
    fn find(&self, predicate: impl Fn(&Identity) -> bool) -> Option<&Identity> {
        self.by_uuid.values().find(|identity| predicate(*identity))
    }

    fn conflict(
        &self,
        uuid: &IdentityUuid,
        username: &Username,
        email: &str,
    ) -> Option<UniqueField> {
        if self.find(|i| i.uuid != *uuid && i.email == email).is_some() {
            Some(UniqueField::Email)
        } else if self
            .find(|i| i.uuid != *uuid && i.username == *username)
            .is_some()
        {
            Some(UniqueField::Username)
        } else {
            None
        }
    }
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed identity, bypassing registration.
    pub async fn insert(&self, identity: Identity) {
        let mut identities = self.inner.write().await;
        identities.next_id = identities.next_id.max(identity.id.0);
        identities.by_uuid.insert(identity.uuid, identity);
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError> {
        let identities = self.inner.read().await;
        Ok(identities.find(|i| i.email == email).is_some())
    }

    async fn exists_by_username(&self, username: &Username) -> Result<bool, RepositoryError> {
        let identities = self.inner.read().await;
        Ok(identities.find(|i| i.username == *username).is_some())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, RepositoryError> {
        let identities = self.inner.read().await;
        Ok(identities
            .find(|i| i.email == email && i.metadata.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_uuid(
        &self,
        uuid: &IdentityUuid,
    ) -> Result<Option<Identity>, RepositoryError> {
        let identities = self.inner.read().await;
        Ok(identities
            .by_uuid
            .get(uuid)
            .filter(|i| i.metadata.deleted_at.is_none())
            .cloned())
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, RepositoryError> {
        let mut identities = self.inner.write().await;

        if identities.by_uuid.contains_key(&identity.uuid) {
            return Err(RepositoryError::Duplicate(UniqueField::Uuid));
        }
        if let Some(field) =
            identities.conflict(&identity.uuid, &identity.username, &identity.email)
        {
            return Err(RepositoryError::Duplicate(field));
        }

        identities.next_id += 1;
        let created = Identity {
            id: IdentityId(identities.next_id),
            uuid: identity.uuid,
            username: identity.username,
            email: identity.email,
            password_hash: identity.password_hash,
            avatar: None,
            bio: None,
            role: identity.role,
            status: identity.status,
            last_login_at: None,
            metadata: Metadata::new(Utc::now()),
        };
        identities.by_uuid.insert(created.uuid, created.clone());

        Ok(created)
    }

    async fn update(&self, identity: Identity) -> Result<Identity, RepositoryError> {
        let mut identities = self.inner.write().await;

        if !identities.by_uuid.contains_key(&identity.uuid) {
            return Err(RepositoryError::NotFound);
        }
        if let Some(field) =
            identities.conflict(&identity.uuid, &identity.username, &identity.email)
        {
            return Err(RepositoryError::Duplicate(field));
        }

        identities.by_uuid.insert(identity.uuid, identity.clone());
        Ok(identity)
    }
}
