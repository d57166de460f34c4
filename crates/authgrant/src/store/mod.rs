//! Persistence behind a narrow injected interface.
//!
//! The grant core never touches a concrete database; it talks to [`Storage`],
//! a find/save/take contract over clients and authorization codes. The
//! in-memory [`MemoryStore`] is the default backend. A background sweep
//! ([`start_cleanup_task`]) discards codes that expired without being
//! consumed.

pub mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{AuthorizationCode, Client};

/// Sweep interval for expired, unconsumed codes: 5 minutes.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Errors from the backing store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The store could not complete the operation.
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
}

/// Storage contract for clients and authorization codes.
///
/// `take_code` is the one operation with a concurrency contract stronger
/// than read-then-write: it must atomically remove and return the record, so
/// that two concurrent callers racing on the same code see exactly one
/// `Some`.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_client(&self, client: Client) -> Result<(), StorageError>;

    async fn find_client(&self, client_id: &str) -> Result<Option<Client>, StorageError>;

    async fn save_code(&self, code: AuthorizationCode) -> Result<(), StorageError>;

    /// Atomically remove and return the code record, if present.
    async fn take_code(&self, code: &str) -> Result<Option<AuthorizationCode>, StorageError>;

    /// Discard codes whose expiry is at or before `now`, returning how many
    /// were removed.
    async fn purge_expired_codes(&self, now: DateTime<Utc>) -> Result<usize, StorageError>;
}

/// Start the background sweep that discards expired, unconsumed codes.
///
/// Consumed codes are removed on the exchange path; this task only reclaims
/// codes that were issued and then abandoned.
pub fn start_cleanup_task(store: Arc<dyn Storage>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match store.purge_expired_codes(Utc::now()).await {
                Ok(removed) if removed > 0 => {
                    tracing::debug!(count = removed, "Cleaned up expired authorization codes");
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "Authorization code cleanup failed"),
            }
        }
    });
}
