//! # Digest Utility
//!
//! Deterministic one-way digest over arbitrary byte content.
//!
//! The digest recorded with a message is computed over the *plaintext*, not
//! the ciphertext, and is the authoritative integrity check on receipt —
//! independent of the AES-GCM authentication tag. For that check to mean
//! anything, identical input must produce identical output across processes
//! and platforms, which SHA-256 in lowercase hex guarantees.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest in characters
pub const DIGEST_HEX_LEN: usize = 64;

/// Compute the SHA-256 digest of `content`, hex-encoded (lowercase)
///
/// Pure and deterministic; no side effects.
///
/// ## Example
///
/// ```
/// use sotto_core::crypto::hash::digest;
///
/// let d = digest(b"hello");
/// assert_eq!(d.len(), 64);
/// assert_eq!(d, digest(b"hello"));
/// ```
pub fn digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        assert_eq!(digest(b"hello"), digest(b"hello"));
        assert_ne!(digest(b"hello"), digest(b"hello!"));
    }

    #[test]
    fn test_digest_length() {
        assert_eq!(digest(b"").len(), DIGEST_HEX_LEN);
        assert_eq!(digest(&[0u8; 1024]).len(), DIGEST_HEX_LEN);
    }

    #[test]
    fn test_digest_known_vector() {
        // SHA-256 of the empty string
        assert_eq!(
            digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        // SHA-256 of "abc"
        assert_eq!(
            digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
