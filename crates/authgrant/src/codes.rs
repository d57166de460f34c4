//! One-time authorization codes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::config::defaults;
use crate::error::{Error, Result};
use crate::random;
use crate::store::Storage;
use crate::types::AuthorizationCode;

/// What a successful consume yields: the resource owner the code was bound to.
#[derive(Debug, Clone)]
pub struct ConsumedCode {
    pub subject_id: String,
}

/// Issues and consumes single-use authorization codes.
#[derive(Clone)]
pub struct AuthCodes {
    store: Arc<dyn Storage>,
    ttl: chrono::Duration,
}

impl AuthCodes {
    #[must_use]
    pub fn new(store: Arc<dyn Storage>, ttl: Duration) -> Self {
        let seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self { store, ttl: chrono::Duration::seconds(seconds) }
    }

    /// Issue a fresh unguessable code expiring at `now + ttl`.
    pub async fn issue(
        &self,
        client_id: &str,
        subject_id: &str,
        redirect_uri: &str,
    ) -> Result<String> {
        let code = random::urlsafe_token(defaults::AUTH_CODE_BYTES)?;

        self.store
            .save_code(AuthorizationCode {
                code: code.clone(),
                client_id: client_id.to_owned(),
                subject_id: subject_id.to_owned(),
                redirect_uri: redirect_uri.to_owned(),
                expires_at: Utc::now() + self.ttl,
            })
            .await?;

        tracing::debug!(client_id = %client_id, "issued authorization code");
        Ok(code)
    }

    /// Consume a code: atomic check-and-delete.
    ///
    /// The record is removed from the store before the owner, redirect URI,
    /// and expiry checks run, so no second caller can ever consume the same
    /// code. A consume attempt with mismatched parameters burns the code
    /// (RFC 6749 treats a code presented with bad parameters as compromised).
    pub async fn consume(
        &self,
        code: &str,
        client_id: &str,
        redirect_uri: &str,
    ) -> Result<ConsumedCode> {
        let Some(record) = self.store.take_code(code).await? else {
            return Err(Error::InvalidOrExpiredCode);
        };

        if record.client_id != client_id
            || record.redirect_uri != redirect_uri
            || record.is_expired(Utc::now())
        {
            return Err(Error::InvalidOrExpiredCode);
        }

        Ok(ConsumedCode { subject_id: record.subject_id })
    }
}

impl std::fmt::Debug for AuthCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCodes").field("ttl", &self.ttl).finish()
    }
}
