//! # Symmetric Key Module
//!
//! AES-256-GCM session keys for message confidentiality and integrity.
//!
//! ## Encryption Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      MESSAGE ENCRYPTION FLOW                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Step 1: Obtain SessionKey (once per conversation, via the             │
//! │          key exchange coordinator)                                      │
//! │                                                                         │
//! │  Step 2: Generate Nonce (unique per message)                           │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  Random 12 bytes from CSPRNG                                 │       │
//! │  │  (Never reuse a nonce with the same key!)                   │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 3: Encrypt                                                       │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  AES-256-GCM(key, nonce, plaintext)                          │       │
//! │  │           ↓                                                  │       │
//! │  │  Ciphertext + 16-byte Auth Tag                              │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Output: (ciphertext_with_tag, nonce)                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Nonce Policy
//!
//! Nonces are generated *inside* [`SessionKey::encrypt`] and never accepted
//! as caller input. Reusing a nonce under the same key breaks AES-GCM
//! entirely (authentication key recovery, message forgery), so the API makes
//! reuse structurally impossible on the encryption path.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::RngCore;
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of a session key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// A nonce (number used once) for AES-GCM encryption
///
/// Produced by [`SessionKey::encrypt`]; carried alongside the ciphertext in
/// the message envelope so the receiver can decrypt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a cryptographically random nonce
    fn random() -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from existing bytes (decryption path only)
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a byte slice, validating the length
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; NONCE_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::MalformedEnvelope(format!(
                "Nonce must be {} bytes, got {}",
                NONCE_SIZE,
                bytes.len()
            )))?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// A symmetric session key shared between exactly two identities
///
/// One key covers the entire conversation lifetime: there is no rotation
/// and no forward secrecy. Zeroized when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SessionKey([u8; KEY_SIZE]);

impl SessionKey {
    /// Generate a fresh random session key
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Export as a portable string (base64)
    ///
    /// The exported form round-trips losslessly through [`SessionKey::import`].
    pub fn export(&self) -> String {
        BASE64.encode(self.0)
    }

    /// Import a key previously produced by [`SessionKey::export`]
    pub fn import(exported: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(exported)
            .map_err(|e| Error::InvalidKey(format!("Invalid base64 session key: {}", e)))?;
        let bytes: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::InvalidKey("Session key must be 32 bytes".into()))?;
        Ok(Self(bytes))
    }

    /// Get the raw key bytes (for sealed-box transmission to the peer)
    ///
    /// ## Security Warning
    ///
    /// Only pass these bytes to the asymmetric wrapper. Never log or store
    /// them unencrypted outside the key store.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Encrypt a plaintext under this key with a fresh random nonce
    ///
    /// Returns `(ciphertext_with_tag, nonce)`. The nonce is generated
    /// internally; callers cannot supply one.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<(Vec<u8>, Nonce)> {
        let nonce = Nonce::random();
        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| Error::EncryptionFailed(format!("Invalid key: {}", e)))?;

        let ciphertext = cipher
            .encrypt(AesNonce::from_slice(&nonce.0), plaintext)
            .map_err(|e| Error::EncryptionFailed(format!("Encryption failed: {}", e)))?;

        Ok((ciphertext, nonce))
    }

    /// Decrypt a ciphertext produced by [`SessionKey::encrypt`]
    ///
    /// ## Errors
    ///
    /// Returns `DecryptionFailed` if the key or nonce is wrong or the
    /// ciphertext was tampered with (authentication tag mismatch).
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &Nonce) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| Error::DecryptionFailed(format!("Invalid key: {}", e)))?;

        cipher
            .decrypt(AesNonce::from_slice(&nonce.0), ciphertext)
            .map_err(|_| {
                Error::DecryptionFailed("authentication tag mismatch".into())
            })
    }
}

impl std::fmt::Debug for SessionKey {
    // Key material must never reach logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_basic() {
        let key = SessionKey::generate();
        let plaintext = b"Hello, World!";

        let (ciphertext, nonce) = key.encrypt(plaintext).unwrap();
        let decrypted = key.decrypt(&ciphertext, &nonce).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_decrypt_empty() {
        let key = SessionKey::generate();

        let (ciphertext, nonce) = key.encrypt(b"").unwrap();
        let decrypted = key.decrypt(&ciphertext, &nonce).unwrap();

        assert_eq!(decrypted, b"");
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = SessionKey::generate();
        let (mut ciphertext, nonce) = key.encrypt(b"Hello, World!").unwrap();

        ciphertext[0] ^= 0xFF;

        let result = key.decrypt(&ciphertext, &nonce);
        assert!(matches!(result, Err(Error::DecryptionFailed(_))));
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = SessionKey::generate();
        let key2 = SessionKey::generate();

        let (ciphertext, nonce) = key1.encrypt(b"secret").unwrap();
        let result = key2.decrypt(&ciphertext, &nonce);

        assert!(matches!(result, Err(Error::DecryptionFailed(_))));
    }

    #[test]
    fn test_wrong_nonce_fails() {
        let key = SessionKey::generate();
        let (ciphertext, _) = key.encrypt(b"secret").unwrap();

        let wrong_nonce = Nonce::from_bytes([7u8; NONCE_SIZE]);
        let result = key.decrypt(&ciphertext, &wrong_nonce);

        assert!(matches!(result, Err(Error::DecryptionFailed(_))));
    }

    #[test]
    fn test_export_import_round_trip() {
        let key = SessionKey::generate();
        let (ciphertext, nonce) = key.encrypt(b"portable").unwrap();

        let imported = SessionKey::import(&key.export()).unwrap();
        let decrypted = imported.decrypt(&ciphertext, &nonce).unwrap();

        assert_eq!(decrypted, b"portable");
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(SessionKey::import("not base64!!!").is_err());
        // Valid base64 but wrong length
        assert!(SessionKey::import(&BASE64.encode([1u8; 16])).is_err());
    }

    #[test]
    fn test_fresh_nonce_per_encryption() {
        let key = SessionKey::generate();

        let (ct1, n1) = key.encrypt(b"same plaintext").unwrap();
        let (ct2, n2) = key.encrypt(b"same plaintext").unwrap();

        // Internal random nonces: same input never yields the same output
        assert_ne!(n1, n2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn test_nonce_from_slice_validates_length() {
        assert!(Nonce::from_slice(&[0u8; NONCE_SIZE]).is_ok());
        assert!(Nonce::from_slice(&[0u8; 11]).is_err());
        assert!(Nonce::from_slice(&[0u8; 16]).is_err());
    }
}
