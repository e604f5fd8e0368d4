//! Opaque token generation and hashing.
//!
//! A token is 32 bytes from the OS CSPRNG, handed to the client once as unpadded base64url (43
//! characters). Only its SHA-256 digest is ever stored.

use base64::{Engine as _, engine::general_purpose};
use rand::prelude::RngExt;
use rand::rng;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of random bytes in a token.
pub const TOKEN_BYTES: usize = 32;

/// Length of the encoded plaintext.
pub const TOKEN_PLAINTEXT_LEN: usize = 43;

/// A token's plaintext. Wiped from memory on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct TokenPlaintext(String);

impl TokenPlaintext {
    /// Draw a fresh token.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rng().fill(&mut bytes);
        let encoded = general_purpose::URL_SAFE_NO_PAD.encode(bytes);
        bytes.zeroize();
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn hash(&self) -> [u8; 32] {
        hash_token(&self.0)
    }
}

impl fmt::Debug for TokenPlaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenPlaintext(<redacted>)")
    }
}

// The plaintext is only ever serialized into the one response that hands it to its owner
impl Serialize for TokenPlaintext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// SHA-256 digest of a plaintext token, as stored.
pub fn hash_token(plaintext: &str) -> [u8; 32] {
    Sha256::digest(plaintext.as_bytes()).into()
}

/// True if `plaintext` could have come from [`TokenPlaintext::generate`].
pub fn is_well_formed(plaintext: &str) -> bool {
    plaintext.len() == TOKEN_PLAINTEXT_LEN
        && plaintext
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let token1 = TokenPlaintext::generate();
        let token2 = TokenPlaintext::generate();

        assert_ne!(token1, token2);
        assert_eq!(token1.as_str().len(), TOKEN_PLAINTEXT_LEN);
        assert!(is_well_formed(token1.as_str()));
        assert!(!token1.as_str().contains('='));
    }

    #[test]
    fn test_hash_is_sha256_of_plaintext() {
        let token = TokenPlaintext::generate();
        assert_eq!(token.hash(), hash_token(token.as_str()));
        // Known vector
        assert_eq!(
            hash_token("abc")[..4],
            [0xba, 0x78, 0x16, 0xbf],
        );
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = TokenPlaintext::generate();
        let debug = format!("{token:?}");
        assert!(!debug.contains(token.as_str()));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let token = TokenPlaintext::generate();
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json, serde_json::Value::String(token.as_str().to_string()));
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed(&"A".repeat(43)));
        assert!(!is_well_formed(&"A".repeat(26)));
        assert!(!is_well_formed(&"A".repeat(44)));
        assert!(!is_well_formed(&format!("{}=", "A".repeat(42))));
        assert!(!is_well_formed(""));
    }
}
