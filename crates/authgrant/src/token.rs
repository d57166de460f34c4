//! Signed, self-contained access and refresh tokens.
//!
//! Tokens are HS256 JWTs. Each kind has its own signing secret and lifetime,
//! and carries a `kind` claim, so a refresh token can never verify as an
//! access token or vice versa. Verification is a pure function of the token
//! string, the expected kind, and the clock — no store is consulted, which
//! means tokens stay valid until natural expiry (accepted limitation).

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};

const ALG: Algorithm = Algorithm::HS256;

/// The two token kinds, each with an independent secret and lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Claims carried inside every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Resource-owner identifier.
    pub sub: String,
    /// Client the token was issued to.
    pub client_id: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
    /// Token kind marker.
    pub kind: TokenKind,
}

/// An access + refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct KindKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl KindKeys {
    fn new(secret: &str, lifetime: std::time::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs: i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX),
        }
    }
}

/// Issues and verifies signed tokens.
pub struct TokenIssuer {
    access: KindKeys,
    refresh: KindKeys,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            access: KindKeys::new(&config.access_token_secret, config.access_token_lifetime),
            refresh: KindKeys::new(&config.refresh_token_secret, config.refresh_token_lifetime),
        }
    }

    const fn keys(&self, kind: TokenKind) -> &KindKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Issue a token of the given kind, bound to a subject and client.
    pub fn issue(&self, kind: TokenKind, subject_id: &str, client_id: &str) -> Result<String> {
        let keys = self.keys(kind);
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: subject_id.to_owned(),
            client_id: client_id.to_owned(),
            iat: now,
            exp: now + keys.lifetime_secs,
            kind,
        };

        encode(&Header::new(ALG), &claims, &keys.encoding)
            .map_err(|e| Error::internal(format!("token encoding failed: {e}")))
    }

    /// Issue a fresh access + refresh pair for one subject/client binding.
    pub fn issue_pair(&self, subject_id: &str, client_id: &str) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue(TokenKind::Access, subject_id, client_id)?,
            refresh_token: self.issue(TokenKind::Refresh, subject_id, client_id)?,
        })
    }

    /// Verify a token against the secret for `kind` and return its claims.
    ///
    /// Fails with `InvalidToken` on bad signature, malformed structure,
    /// expiry (zero leeway), or a kind claim that does not match.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims> {
        let mut validation = Validation::new(ALG);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<TokenClaims>(token, &self.keys(kind).decoding, &validation)
            .map_err(|_| Error::InvalidToken)?;

        if data.claims.kind != kind {
            return Err(Error::InvalidToken);
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&Config::for_testing())
    }

    #[test]
    fn test_roundtrip_preserves_binding() {
        let issuer = issuer();
        let token = issuer.issue(TokenKind::Access, "subject1", "client1").unwrap();

        let claims = issuer.verify(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, "subject1");
        assert_eq!(claims.client_id, "client1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_kind_isolation() {
        let issuer = issuer();
        let pair = issuer.issue_pair("subject1", "client1").unwrap();

        assert!(matches!(
            issuer.verify(&pair.access_token, TokenKind::Refresh),
            Err(Error::InvalidToken)
        ));
        assert!(matches!(
            issuer.verify(&pair.refresh_token, TokenKind::Access),
            Err(Error::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = Config::for_testing();
        let issuer = TokenIssuer::new(&config);

        // Hand-encode claims with an exp in the past, signed with the real
        // access secret.
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: "subject1".into(),
            client_id: "client1".into(),
            iat: now - 7200,
            exp: now - 3600,
            kind: TokenKind::Access,
        };
        let token = encode(
            &Header::new(ALG),
            &claims,
            &EncodingKey::from_secret(config.access_token_secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(issuer.verify(&token, TokenKind::Access), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer_a = issuer();
        let mut other = Config::for_testing();
        other.access_token_secret = "a-completely-different-secret!!!".into();
        let issuer_b = TokenIssuer::new(&other);

        let token = issuer_a.issue(TokenKind::Access, "subject1", "client1").unwrap();
        assert!(matches!(issuer_b.verify(&token, TokenKind::Access), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let issuer = issuer();
        assert!(matches!(issuer.verify("not-a-jwt", TokenKind::Access), Err(Error::InvalidToken)));
        assert!(matches!(issuer.verify("", TokenKind::Refresh), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_pair_tokens_differ() {
        let issuer = issuer();
        let pair = issuer.issue_pair("subject1", "client1").unwrap();
        assert_ne!(pair.access_token, pair.refresh_token);
    }
}
