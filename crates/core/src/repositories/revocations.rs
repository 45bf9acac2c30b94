use crate::repositories::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Record of tokens that were logged out before they expired.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Marks the token id as revoked until `expires_at`. Revoking twice is not an error.
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> StoreResult<()>;

    async fn is_revoked(&self, jti: &str) -> StoreResult<bool>;
}

/// Process-local revocation list keyed by token id.
///
/// Entries are only needed until the token would have expired anyway, so expired
/// entries are dropped on every write.
#[derive(Default)]
pub struct InMemoryRevocationStore {
    revoked: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> StoreResult<()> {
        let now = Utc::now();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        if expires_at > now {
            revoked.insert(jti.to_string(), expires_at);
        }
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> StoreResult<bool> {
        let now = Utc::now();
        let revoked = self.revoked.read().await;
        Ok(revoked.get(jti).is_some_and(|exp| *exp > now))
    }
}
