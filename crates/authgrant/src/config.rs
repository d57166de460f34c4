//! Configuration for the authorization server.

use std::time::Duration;

/// Grant lifecycle constants.
pub mod defaults {
    use std::time::Duration;

    /// Authorization code lifetime: 5 minutes.
    pub const AUTH_CODE_TTL: Duration = Duration::from_secs(5 * 60);

    /// Access token lifetime: 1 hour.
    pub const ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

    /// Refresh token lifetime: 7 days.
    pub const REFRESH_TOKEN_LIFETIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    /// Random bytes in a client secret (256 bits).
    pub const CLIENT_SECRET_BYTES: usize = 32;

    /// Random bytes in an authorization code (256 bits).
    pub const AUTH_CODE_BYTES: usize = 32;
}

/// Server configuration.
///
/// The two signing secrets are deliberately independent: an access token can
/// never verify under the refresh secret or vice versa.
#[derive(Clone)]
pub struct Config {
    /// HMAC secret for access tokens.
    pub access_token_secret: String,

    /// HMAC secret for refresh tokens.
    pub refresh_token_secret: String,

    /// Authorization code time-to-live.
    pub auth_code_ttl: Duration,

    /// Access token lifetime.
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    pub refresh_token_lifetime: Duration,
}

impl Config {
    /// Create a configuration with the standard lifetimes.
    #[must_use]
    pub fn new(access_token_secret: String, refresh_token_secret: String) -> Self {
        Self {
            access_token_secret,
            refresh_token_secret,
            auth_code_ttl: defaults::AUTH_CODE_TTL,
            access_token_lifetime: defaults::ACCESS_TOKEN_LIFETIME,
            refresh_token_lifetime: defaults::REFRESH_TOKEN_LIFETIME,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if either signing secret is missing from the
    /// environment.
    pub fn from_env() -> anyhow::Result<Self> {
        use anyhow::Context;

        let access = std::env::var("ACCESS_TOKEN_SECRET")
            .context("ACCESS_TOKEN_SECRET must be set")?;
        let refresh = std::env::var("REFRESH_TOKEN_SECRET")
            .context("REFRESH_TOKEN_SECRET must be set")?;
        Ok(Self::new(access, refresh))
    }

    /// Create a test configuration with fixed secrets.
    #[must_use]
    pub fn for_testing() -> Self {
        Self::new(
            "test-access-secret-at-least-32-bytes!!".to_string(),
            "test-refresh-secret-at-least-32-bytes!".to_string(),
        )
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_token_secret", &"<redacted>")
            .field("refresh_token_secret", &"<redacted>")
            .field("auth_code_ttl", &self.auth_code_ttl)
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .finish()
    }
}
