use std::time::Instant;

use async_trait::async_trait;
use chrono::Duration;
use dashmap::DashMap;

use crate::identity::errors::RevocationStoreError;
use crate::identity::ports::RevocationStore;

/// Process-local revocation set keyed by token id.
///
/// Entries carry their own expiry; expired ones read as absent and are
/// pruned on the next revocation.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    revoked: DashMap<String, Instant>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }

    fn prune(&self, now: Instant) {
        self.revoked.retain(|_, expires_at| *expires_at > now);
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), RevocationStoreError> {
        let Ok(ttl) = ttl.to_std() else {
            return Ok(());
        };
        if ttl.is_zero() {
            return Ok(());
        }

        let now = Instant::now();
        self.prune(now);

        let expires_at = now + ttl;
        self.revoked
            .entry(jti.to_string())
            .and_modify(|current| *current = (*current).max(expires_at))
            .or_insert(expires_at);

        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, RevocationStoreError> {
        Ok(self
            .revoked
            .get(jti)
            .is_some_and(|expires_at| *expires_at > Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revoke_then_check() {
        let store = InMemoryRevocationStore::new();

        store.revoke("jti-1", Duration::minutes(5)).await.unwrap();

        assert!(store.is_revoked("jti-1").await.unwrap());
        assert!(!store.is_revoked("jti-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_non_positive_ttl_records_nothing() {
        let store = InMemoryRevocationStore::new();

        store.revoke("zero", Duration::zero()).await.unwrap();
        store.revoke("negative", Duration::seconds(-10)).await.unwrap();

        assert!(store.is_empty());
        assert!(!store.is_revoked("zero").await.unwrap());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = InMemoryRevocationStore::new();

        store
            .revoke("short", Duration::milliseconds(20))
            .await
            .unwrap();
        assert!(store.is_revoked("short").await.unwrap());

        tokio::time::sleep(std::time::Duration::from_millis(40)).await;
        assert!(!store.is_revoked("short").await.unwrap());

        store.revoke("other", Duration::minutes(1)).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_revoking_twice_keeps_later_expiry() {
        let store = InMemoryRevocationStore::new();

        store.revoke("jti", Duration::minutes(10)).await.unwrap();
        store.revoke("jti", Duration::milliseconds(1)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert!(store.is_revoked("jti").await.unwrap());
    }
}
