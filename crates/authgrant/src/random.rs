//! Credential material from the OS CSPRNG.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

/// Generate `byte_length` random bytes, base64url-encoded without padding.
///
/// Used for client secrets and authorization codes; 32 bytes gives 256 bits
/// of entropy.
pub fn urlsafe_token(byte_length: usize) -> Result<String> {
    let mut bytes = vec![0u8; byte_length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::internal(format!("rng failure: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(&bytes))
}

/// Constant-time string equality for secret comparison.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlsafe_token_is_url_safe() {
        let token = urlsafe_token(32).unwrap();
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
        assert!(!token.contains('='));
    }

    #[test]
    fn test_urlsafe_token_is_random() {
        let a = urlsafe_token(32).unwrap();
        let b = urlsafe_token(32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("secret", "secret"));
        assert!(!constant_time_eq("secret", "Secret"));
        assert!(!constant_time_eq("secret", "secre"));
    }
}
