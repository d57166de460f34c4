//! Client registration and credential lookup.

use std::sync::Arc;

use crate::config::defaults;
use crate::error::{Error, Result};
use crate::random;
use crate::store::Storage;
use crate::types::Client;

/// Registry of OAuth clients.
///
/// Clients are created once at registration and never updated or deleted.
#[derive(Clone)]
pub struct ClientRegistry {
    store: Arc<dyn Storage>,
}

impl ClientRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    /// Register a new client with a fresh id/secret pair.
    ///
    /// The id is a 128-bit UUID, the secret 256 bits from the OS CSPRNG.
    pub async fn register(
        &self,
        redirect_uris: Vec<String>,
        grants: Vec<String>,
    ) -> Result<Client> {
        let client = Client {
            client_id: uuid::Uuid::new_v4().simple().to_string(),
            client_secret: random::urlsafe_token(defaults::CLIENT_SECRET_BYTES)?,
            redirect_uris,
            grants,
        };

        self.store.save_client(client.clone()).await?;

        tracing::info!(client_id = %client.client_id, "registered client");
        Ok(client)
    }

    /// Look up a client by id and secret.
    ///
    /// The secret comparison is constant-time to avoid a timing side channel.
    pub async fn find_by_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Client> {
        let client = self
            .store
            .find_client(client_id)
            .await?
            .ok_or(Error::InvalidClient)?;

        if !random::constant_time_eq(&client.client_secret, client_secret) {
            return Err(Error::InvalidClient);
        }

        Ok(client)
    }

    /// Look up a client by id alone.
    pub async fn find_by_id(&self, client_id: &str) -> Result<Client> {
        self.store
            .find_client(client_id)
            .await?
            .ok_or(Error::InvalidClient)
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn registry() -> ClientRegistry {
        ClientRegistry::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_register_generates_fresh_credentials() {
        let registry = registry();
        let a = registry.register(vec!["https://app/cb".into()], vec![]).await.unwrap();
        let b = registry.register(vec!["https://app/cb".into()], vec![]).await.unwrap();

        assert_ne!(a.client_id, b.client_id);
        assert_ne!(a.client_secret, b.client_secret);
        assert_eq!(a.client_id.len(), 32); // uuid simple form
    }

    #[tokio::test]
    async fn test_find_by_credentials() {
        let registry = registry();
        let client = registry.register(vec!["https://app/cb".into()], vec![]).await.unwrap();

        let found = registry
            .find_by_credentials(&client.client_id, &client.client_secret)
            .await
            .unwrap();
        assert_eq!(found.client_id, client.client_id);
    }

    #[tokio::test]
    async fn test_wrong_secret_is_invalid_client() {
        let registry = registry();
        let client = registry.register(vec![], vec![]).await.unwrap();

        let result = registry.find_by_credentials(&client.client_id, "wrong").await;
        assert!(matches!(result, Err(Error::InvalidClient)));
    }

    #[tokio::test]
    async fn test_unknown_client_is_invalid_client() {
        let registry = registry();
        assert!(matches!(registry.find_by_id("nope").await, Err(Error::InvalidClient)));
        assert!(matches!(
            registry.find_by_credentials("nope", "secret").await,
            Err(Error::InvalidClient)
        ));
    }
}
