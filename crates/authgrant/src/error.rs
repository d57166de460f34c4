//! Error types for the grant state machine.
//!
//! Uses `thiserror` for structured error handling. Every variant except
//! `Storage` and `Internal` is a validation failure recovered locally and
//! surfaced to the caller as a structured wire error with no internal detail.

use crate::store::StorageError;

/// Errors from grant processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Client is unknown or its credentials do not match.
    #[error("invalid client credentials")]
    InvalidClient,

    /// Redirect URI is not in the client's registered set.
    #[error("redirect URI is not registered for this client")]
    InvalidRedirectUri,

    /// Authorization was requested with a `response_type` other than `code`.
    #[error("unsupported response type")]
    UnsupportedResponseType,

    /// Authorization code is missing, already consumed, mismatched, or past
    /// its expiry.
    #[error("invalid or expired authorization code")]
    InvalidOrExpiredCode,

    /// Token request carried an unknown `grant_type`.
    #[error("unsupported grant type")]
    UnsupportedGrantType,

    /// Token failed signature, structure, kind, or expiry verification.
    #[error("invalid token")]
    InvalidToken,

    /// No bearer token was presented.
    #[error("access token required")]
    MissingToken,

    /// Backing store failure. Fatal for the current request, not the process.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Unexpected internal failure (e.g. token encoding).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable wire code for the client-facing error body.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidClient => "invalid_client",
            Self::InvalidRedirectUri => "invalid_redirect_uri",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidOrExpiredCode => "invalid_or_expired_code",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidToken => "invalid_token",
            Self::MissingToken => "missing_token",
            Self::Storage(_) => "storage_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Result type alias for grant operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_snake_case() {
        let errors = [
            Error::InvalidClient,
            Error::InvalidRedirectUri,
            Error::UnsupportedResponseType,
            Error::InvalidOrExpiredCode,
            Error::UnsupportedGrantType,
            Error::InvalidToken,
            Error::MissingToken,
            Error::internal("boom"),
        ];
        for err in errors {
            let code = err.error_code();
            assert!(code.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }

    #[test]
    fn test_storage_error_converts() {
        let err: Error = StorageError::Unavailable("down".into()).into();
        assert_eq!(err.error_code(), "storage_error");
    }
}
