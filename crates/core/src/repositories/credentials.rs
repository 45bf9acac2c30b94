use crate::config::ClinicConfig;
use crate::repositories::StoreResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// Lookup of stored password hashes by username.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The encoded password hash for `username`, if the user exists.
    async fn password_hash(&self, username: &str) -> StoreResult<Option<String>>;
}

/// Credential store fixed at startup from `CLINIC_USERS`.
#[derive(Clone, Default)]
pub struct StaticCredentialStore {
    users: HashMap<String, String>,
}

impl StaticCredentialStore {
    pub fn new(users: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            users: users.into_iter().collect(),
        }
    }

    pub fn from_config(cfg: &ClinicConfig) -> Self {
        Self::new(
            cfg.users()
                .iter()
                .map(|u| (u.username.clone(), u.password_hash.clone())),
        )
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.users.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn password_hash(&self, username: &str) -> StoreResult<Option<String>> {
        Ok(self.users.get(username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn looks_up_hash_by_exact_username() {
        let store = StaticCredentialStore::new([("drsmith".to_string(), "h1".to_string())]);

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.password_hash("drsmith").await.unwrap().as_deref(),
            Some("h1")
        );
        assert_eq!(store.password_hash("DrSmith").await.unwrap(), None);
        assert_eq!(store.password_hash("nobody").await.unwrap(), None);
    }

    #[test]
    fn empty_config_gives_empty_store() {
        let cfg = ClinicConfig::from_lookup(|_| None).unwrap();
        assert!(StaticCredentialStore::from_config(&cfg).is_empty());
    }
}
