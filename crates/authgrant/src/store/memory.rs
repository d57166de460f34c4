//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use chrono::{DateTime, Utc};

use super::{Storage, StorageError};
use crate::types::{AuthorizationCode, Client};

/// In-memory store backed by `RwLock<HashMap>` tables.
///
/// `take_code` holds the write lock across the removal, which is what makes
/// one-time consumption atomic under concurrent exchange attempts.
#[derive(Clone, Default)]
pub struct MemoryStore {
    clients: Arc<RwLock<HashMap<String, Client>>>,
    codes: Arc<RwLock<HashMap<String, AuthorizationCode>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn save_client(&self, client: Client) -> Result<(), StorageError> {
        self.clients.write().await.insert(client.client_id.clone(), client);
        Ok(())
    }

    async fn find_client(&self, client_id: &str) -> Result<Option<Client>, StorageError> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }

    async fn save_code(&self, code: AuthorizationCode) -> Result<(), StorageError> {
        self.codes.write().await.insert(code.code.clone(), code);
        Ok(())
    }

    async fn take_code(&self, code: &str) -> Result<Option<AuthorizationCode>, StorageError> {
        Ok(self.codes.write().await.remove(code))
    }

    async fn purge_expired_codes(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, code| !code.is_expired(now));
        Ok(before - codes.len())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn code_expiring_at(code: &str, expires_at: DateTime<Utc>) -> AuthorizationCode {
        AuthorizationCode {
            code: code.into(),
            client_id: "client1".into(),
            subject_id: "subject1".into(),
            redirect_uri: "https://app/cb".into(),
            expires_at,
        }
    }

    fn sample_code(code: &str) -> AuthorizationCode {
        code_expiring_at(code, Utc::now() + Duration::minutes(5))
    }

    #[tokio::test]
    async fn test_client_roundtrip() {
        let store = MemoryStore::new();
        let client = Client {
            client_id: "client1".into(),
            client_secret: "secret".into(),
            redirect_uris: vec!["https://app/cb".into()],
            grants: vec!["authorization_code".into()],
        };

        store.save_client(client).await.unwrap();

        let found = store.find_client("client1").await.unwrap().unwrap();
        assert_eq!(found.client_id, "client1");
        assert!(store.find_client("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_take_code_is_one_time() {
        let store = MemoryStore::new();
        store.save_code(sample_code("code1")).await.unwrap();

        assert!(store.take_code("code1").await.unwrap().is_some());
        assert!(store.take_code("code1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_discards_expired_unconsumed_codes() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.save_code(code_expiring_at("stale", now - Duration::seconds(1))).await.unwrap();
        store.save_code(code_expiring_at("live", now + Duration::minutes(5))).await.unwrap();

        let removed = store.purge_expired_codes(now).await.unwrap();
        assert_eq!(removed, 1);

        assert!(store.take_code("stale").await.unwrap().is_none());
        assert!(store.take_code("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purge_with_nothing_expired_removes_nothing() {
        let store = MemoryStore::new();
        store.save_code(sample_code("code1")).await.unwrap();

        assert_eq!(store.purge_expired_codes(Utc::now()).await.unwrap(), 0);
        assert!(store.take_code("code1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_take_code_concurrent_single_winner() {
        let store = Arc::new(MemoryStore::new());
        store.save_code(sample_code("code1")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.take_code("code1").await.unwrap().is_some()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
