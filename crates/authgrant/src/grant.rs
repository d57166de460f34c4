//! The grant state machine.
//!
//! `GrantService` ties the client registry, the authorization-code store,
//! and the token issuer together for the four grant operations plus
//! resource-access validation. Each request is handled independently; the
//! only shared mutable state lives behind the injected [`Storage`].

use std::sync::Arc;

use crate::codes::AuthCodes;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::registry::ClientRegistry;
use crate::store::Storage;
use crate::token::{TokenClaims, TokenIssuer, TokenKind, TokenPair};
use crate::types::Client;

/// The only supported response type at `/authorize`.
pub const RESPONSE_TYPE_CODE: &str = "code";
/// Grant type for the code exchange.
pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
/// Grant type for refresh-token rotation.
pub const GRANT_REFRESH_TOKEN: &str = "refresh_token";

/// An authorization request.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub response_type: String,
    /// Opaque caller state, passed through unchanged and never interpreted.
    pub state: Option<String>,
}

/// A successful authorization: the material for the redirect back to the
/// client.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub redirect_uri: String,
    pub code: String,
    pub state: Option<String>,
}

/// A code-for-tokens exchange request.
#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    pub grant_type: String,
    pub code: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub client_secret: String,
}

/// A refresh-token rotation request.
#[derive(Debug, Clone)]
pub struct RefreshRequest {
    pub grant_type: String,
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Orchestrates the authorization code grant.
pub struct GrantService {
    registry: ClientRegistry,
    codes: AuthCodes,
    tokens: TokenIssuer,
}

impl GrantService {
    #[must_use]
    pub fn new(store: Arc<dyn Storage>, config: &Config) -> Self {
        Self {
            registry: ClientRegistry::new(Arc::clone(&store)),
            codes: AuthCodes::new(store, config.auth_code_ttl),
            tokens: TokenIssuer::new(config),
        }
    }

    /// Register a new client.
    pub async fn register_client(
        &self,
        redirect_uris: Vec<String>,
        grants: Vec<String>,
    ) -> Result<Client> {
        self.registry.register(redirect_uris, grants).await
    }

    /// Handle an authorization request for an already-authenticated subject.
    ///
    /// Subject resolution is the caller's responsibility; this core only
    /// binds the supplied identity into the issued code.
    pub async fn authorize(&self, req: &AuthorizeRequest, subject_id: &str) -> Result<IssuedCode> {
        if req.response_type != RESPONSE_TYPE_CODE {
            return Err(Error::UnsupportedResponseType);
        }

        let client = self.registry.find_by_id(&req.client_id).await?;
        if !client.redirect_uris.iter().any(|u| u == &req.redirect_uri) {
            return Err(Error::InvalidRedirectUri);
        }

        let code = self.codes.issue(&client.client_id, subject_id, &req.redirect_uri).await?;

        tracing::info!(client_id = %client.client_id, "authorization approved");

        Ok(IssuedCode {
            redirect_uri: req.redirect_uri.clone(),
            code,
            state: req.state.clone(),
        })
    }

    /// Exchange an authorization code for an access + refresh token pair.
    pub async fn exchange(&self, req: &ExchangeRequest) -> Result<TokenPair> {
        if req.grant_type != GRANT_AUTHORIZATION_CODE {
            return Err(Error::UnsupportedGrantType);
        }

        let client = self
            .registry
            .find_by_credentials(&req.client_id, &req.client_secret)
            .await?;

        // The code must be consumed before any token exists: a code that
        // fails to consume never produces tokens.
        let consumed = self.codes.consume(&req.code, &client.client_id, &req.redirect_uri).await?;

        let pair = self.tokens.issue_pair(&consumed.subject_id, &client.client_id)?;

        tracing::info!(client_id = %client.client_id, "issued token pair");
        Ok(pair)
    }

    /// Rotate a refresh token into a brand-new access + refresh pair.
    ///
    /// The old refresh token is not invalidated; being stateless, it stays
    /// verifiable until its natural expiry.
    pub async fn refresh(&self, req: &RefreshRequest) -> Result<TokenPair> {
        if req.grant_type != GRANT_REFRESH_TOKEN {
            return Err(Error::UnsupportedGrantType);
        }

        let client = self
            .registry
            .find_by_credentials(&req.client_id, &req.client_secret)
            .await?;

        let claims = self.tokens.verify(&req.refresh_token, TokenKind::Refresh)?;
        if claims.client_id != client.client_id {
            // A refresh token only rotates for the client it was issued to.
            return Err(Error::InvalidToken);
        }

        let pair = self.tokens.issue_pair(&claims.sub, &client.client_id)?;

        tracing::info!(client_id = %client.client_id, "rotated token pair");
        Ok(pair)
    }

    /// Validate a bearer access token for resource access.
    pub fn verify_resource_access(&self, bearer: Option<&str>) -> Result<TokenClaims> {
        let token = bearer.ok_or(Error::MissingToken)?;
        self.tokens.verify(token, TokenKind::Access)
    }
}

impl std::fmt::Debug for GrantService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrantService").finish()
    }
}
