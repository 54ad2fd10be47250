//! CSRF token generation and comparison.

use rand::RngCore;
use subtle::ConstantTimeEq;

/// Default number of random bytes per token.
pub const DEFAULT_TOKEN_BYTES: usize = 40;

/// Issues hex-encoded random tokens of a fixed length.
#[derive(Debug, Clone, Copy)]
pub struct TokenIssuer {
    bytes: usize,
}

impl TokenIssuer {
    /// Create an issuer producing `bytes` random bytes per token (at least one).
    pub fn new(bytes: usize) -> Self {
        Self {
            bytes: bytes.max(1),
        }
    }

    /// Length of issued tokens in characters.
    pub fn token_len(&self) -> usize {
        self.bytes * 2
    }

    /// Generate a fresh token from the thread-local CSPRNG.
    pub fn issue(&self) -> String {
        let mut random_bytes = vec![0u8; self.bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);
        hex::encode(random_bytes)
    }
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_BYTES)
    }
}

/// Compare a submitted token against the stored one in constant time.
pub fn tokens_match(stored: &str, submitted: &str) -> bool {
    !submitted.is_empty() && bool::from(stored.as_bytes().ct_eq(submitted.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn default_token_is_80_hex_chars() {
        let token = TokenIssuer::default().issue();
        assert_eq!(token.len(), 80);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn length_is_configurable() {
        let issuer = TokenIssuer::new(16);
        assert_eq!(issuer.token_len(), 32);
        assert_eq!(issuer.issue().len(), 32);
        assert_eq!(TokenIssuer::new(0).issue().len(), 2);
    }

    #[test]
    fn tokens_are_not_repeated() {
        let issuer = TokenIssuer::default();
        assert_ne!(issuer.issue(), issuer.issue());
    }

    #[test]
    fn comparison_requires_exact_match() {
        assert!(tokens_match("abc123", "abc123"));
        assert!(!tokens_match("abc123", "abc124"));
        assert!(!tokens_match("abc123", "abc"));
        assert!(!tokens_match("", ""));
    }
}
