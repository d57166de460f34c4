//! Domain records for clients and authorization codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered OAuth client. Immutable after registration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Client {
    pub client_id: String,
    pub client_secret: String,
    /// Exact-match redirect URIs allowed at `/authorize`.
    pub redirect_uris: Vec<String>,
    /// Grant types the client declared at registration.
    pub grants: Vec<String>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uris", &self.redirect_uris)
            .field("grants", &self.grants)
            .finish()
    }
}

/// A single-use authorization code, bound to the client and redirect URI it
/// was issued for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    pub code: String,
    pub client_id: String,
    pub subject_id: String,
    pub redirect_uri: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthorizationCode {
    /// Expiry check against an explicit clock reading. Exact comparison, no
    /// skew tolerance.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
