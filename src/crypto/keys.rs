//! # Asymmetric Key Module
//!
//! Identity key pairs and public-key encryption of short payloads.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  IdentityKeyPair (X25519)                                       │   │
//! │  │  ────────────────────────                                        │   │
//! │  │                                                                  │   │
//! │  │  Purpose:                                                       │   │
//! │  │  • One per login session; destroyed at logout                   │   │
//! │  │  • Receiving sealed session keys from peers                     │   │
//! │  │                                                                  │   │
//! │  │  Format:                                                        │   │
//! │  │  • Private key: 32 bytes (process memory only, zeroized)       │   │
//! │  │  • Public key: 32 bytes (published to the directory)           │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sealed Box
//!
//! Public-key encryption is an ephemeral-static X25519 exchange:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  encrypt_with_public_key(payload, recipient_public)                     │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  1. Generate ephemeral X25519 key pair                                  │
//! │  2. DH: ephemeral_private × recipient_public → shared secret           │
//! │  3. HKDF-SHA256(shared, info="sotto-key-wrap-v1") → AES-256 key        │
//! │  4. AES-GCM(key, random nonce, payload) → ciphertext                   │
//! │                                                                         │
//! │  Output: base64( ephemeral_public ‖ nonce ‖ ciphertext )               │
//! │                                                                         │
//! │  Only the holder of the matching private key can repeat the DH and     │
//! │  recover the payload. The ephemeral secret is dropped after step 2,    │
//! │  so not even the sender can re-open the box.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The box only ever wraps a short symmetric key, never message content.
//! Inputs over [`MAX_SEALED_PAYLOAD`] are rejected so bulk data cannot be
//! routed through this path by accident.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use sha2::Sha256;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::ZeroizeOnDrop;

use crate::crypto::encryption::{Nonce, SessionKey, NONCE_SIZE};
use crate::error::{Error, Result};

/// Size of public keys in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Maximum sealed-box payload size in bytes
///
/// Large enough for any exported session key, small enough that nobody
/// mistakes the box for a message channel.
pub const MAX_SEALED_PAYLOAD: usize = 128;

/// HKDF context string binding derived keys to this protocol
const WRAP_CONTEXT: &[u8] = b"sotto-key-wrap-v1";

/// X25519 identity key pair
///
/// ## Security
///
/// - Created at login, dropped at logout; never persisted or transmitted
/// - The private half is zeroized when this struct is dropped
/// - Each call to [`IdentityKeyPair::generate`] yields a fresh, unlinkable pair
#[derive(ZeroizeOnDrop)]
pub struct IdentityKeyPair {
    /// Private key (secret)
    #[zeroize(skip)] // x25519_dalek handles its own zeroization
    secret: StaticSecret,
    /// Public key (derived from secret)
    #[zeroize(skip)]
    public: X25519PublicKey,
}

impl IdentityKeyPair {
    /// Generate a new random key pair
    ///
    /// Uses the operating system's secure random number generator.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Get the public half in portable form
    pub fn public_key(&self) -> IdentityPublicKey {
        IdentityPublicKey(self.public.to_bytes())
    }

    /// Perform Diffie-Hellman against another party's public key
    fn diffie_hellman(&self, their_public: &[u8; 32]) -> [u8; 32] {
        let their_public = X25519PublicKey::from(*their_public);
        self.secret.diffie_hellman(&their_public).to_bytes()
    }
}

/// A public key in portable form
///
/// Contains only public information: safe to serialize, transmit, and store.
/// The directory keeps these as opaque hex strings keyed by username.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityPublicKey([u8; PUBLIC_KEY_SIZE]);

impl IdentityPublicKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Encode as a hex string (for directory storage/transmission)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode from a hex string
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| Error::InvalidKey(format!("Invalid hex public key: {}", e)))?;
        let bytes: [u8; PUBLIC_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::InvalidKey("Public key must be 32 bytes".into()))?;
        Ok(Self(bytes))
    }
}

/// Derive the AES-256 wrapping key from a DH output
fn derive_wrap_key(shared: &[u8; 32]) -> Result<SessionKey> {
    let hkdf = Hkdf::<Sha256>::new(None, shared);
    let mut key = [0u8; 32];
    hkdf.expand(WRAP_CONTEXT, &mut key)
        .map_err(|_| Error::EncryptionFailed("HKDF expansion failed".into()))?;
    Ok(SessionKey::from_bytes(key))
}

/// Encrypt a short payload for the holder of `recipient` (sealed box)
///
/// ## Errors
///
/// Returns `PayloadTooLarge` when the input exceeds [`MAX_SEALED_PAYLOAD`].
pub fn encrypt_with_public_key(payload: &[u8], recipient: &IdentityPublicKey) -> Result<String> {
    if payload.len() > MAX_SEALED_PAYLOAD {
        return Err(Error::PayloadTooLarge {
            size: payload.len(),
            max: MAX_SEALED_PAYLOAD,
        });
    }

    // Ephemeral pair: consumed here, dropped at end of scope
    let ephemeral_secret = StaticSecret::random_from_rng(OsRng);
    let ephemeral_public = X25519PublicKey::from(&ephemeral_secret);

    let their_public = X25519PublicKey::from(*recipient.as_bytes());
    let shared = ephemeral_secret.diffie_hellman(&their_public).to_bytes();

    let wrap_key = derive_wrap_key(&shared)?;
    let (ciphertext, nonce) = wrap_key.encrypt(payload)?;

    let mut sealed = Vec::with_capacity(PUBLIC_KEY_SIZE + NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(ephemeral_public.as_bytes());
    sealed.extend_from_slice(nonce.as_bytes());
    sealed.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(sealed))
}

/// Decrypt a sealed box addressed to `keypair`
///
/// ## Errors
///
/// Returns `DecryptionFailed` if the box was sealed for a different key
/// pair or has been corrupted.
pub fn decrypt_with_private_key(sealed: &str, keypair: &IdentityKeyPair) -> Result<Vec<u8>> {
    let bytes = BASE64
        .decode(sealed)
        .map_err(|e| Error::DecryptionFailed(format!("Invalid base64 sealed box: {}", e)))?;

    if bytes.len() < PUBLIC_KEY_SIZE + NONCE_SIZE {
        return Err(Error::DecryptionFailed(format!(
            "Sealed box of {} bytes is shorter than header",
            bytes.len()
        )));
    }

    let ephemeral_public: [u8; PUBLIC_KEY_SIZE] = bytes[..PUBLIC_KEY_SIZE]
        .try_into()
        .map_err(|_| Error::DecryptionFailed("Invalid ephemeral public key".into()))?;
    let nonce = Nonce::from_slice(&bytes[PUBLIC_KEY_SIZE..PUBLIC_KEY_SIZE + NONCE_SIZE])
        .map_err(|_| Error::DecryptionFailed("Invalid sealed box nonce".into()))?;
    let ciphertext = &bytes[PUBLIC_KEY_SIZE + NONCE_SIZE..];

    let shared = keypair.diffie_hellman(&ephemeral_public);
    let wrap_key = derive_wrap_key(&shared)?;

    wrap_key.decrypt(ciphertext, &nonce)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation_unlinkable() {
        let kp1 = IdentityKeyPair::generate();
        let kp2 = IdentityKeyPair::generate();

        assert_ne!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn test_public_key_hex_round_trip() {
        let kp = IdentityKeyPair::generate();
        let public = kp.public_key();

        let hex = public.to_hex();
        assert_eq!(hex.len(), PUBLIC_KEY_SIZE * 2);

        let restored = IdentityPublicKey::from_hex(&hex).unwrap();
        assert_eq!(public, restored);
    }

    #[test]
    fn test_public_key_from_hex_rejects_garbage() {
        assert!(IdentityPublicKey::from_hex("zzzz").is_err());
        assert!(IdentityPublicKey::from_hex(&hex::encode([1u8; 16])).is_err());
    }

    #[test]
    fn test_seal_unseal_round_trip() {
        let recipient = IdentityKeyPair::generate();
        let payload = b"a short secret payload";

        let sealed = encrypt_with_public_key(payload, &recipient.public_key()).unwrap();
        let opened = decrypt_with_private_key(&sealed, &recipient).unwrap();

        assert_eq!(opened, payload);
    }

    #[test]
    fn test_seal_session_key_round_trip() {
        let recipient = IdentityKeyPair::generate();
        let key = SessionKey::generate();

        let sealed =
            encrypt_with_public_key(key.export().as_bytes(), &recipient.public_key()).unwrap();
        let opened = decrypt_with_private_key(&sealed, &recipient).unwrap();
        let recovered = SessionKey::import(std::str::from_utf8(&opened).unwrap()).unwrap();

        assert_eq!(recovered.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_wrong_private_key_fails() {
        let recipient = IdentityKeyPair::generate();
        let intruder = IdentityKeyPair::generate();

        let sealed = encrypt_with_public_key(b"secret", &recipient.public_key()).unwrap();
        let result = decrypt_with_private_key(&sealed, &intruder);

        assert!(matches!(result, Err(Error::DecryptionFailed(_))));
    }

    #[test]
    fn test_corrupted_sealed_box_fails() {
        let recipient = IdentityKeyPair::generate();
        let sealed = encrypt_with_public_key(b"secret", &recipient.public_key()).unwrap();

        let mut bytes = BASE64.decode(&sealed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let corrupted = BASE64.encode(bytes);

        let result = decrypt_with_private_key(&corrupted, &recipient);
        assert!(matches!(result, Err(Error::DecryptionFailed(_))));
    }

    #[test]
    fn test_truncated_sealed_box_fails() {
        let recipient = IdentityKeyPair::generate();
        let result = decrypt_with_private_key(&BASE64.encode([0u8; 20]), &recipient);
        assert!(matches!(result, Err(Error::DecryptionFailed(_))));
    }

    #[test]
    fn test_payload_ceiling_enforced() {
        let recipient = IdentityKeyPair::generate();

        let at_limit = vec![0u8; MAX_SEALED_PAYLOAD];
        assert!(encrypt_with_public_key(&at_limit, &recipient.public_key()).is_ok());

        let over_limit = vec![0u8; MAX_SEALED_PAYLOAD + 1];
        let result = encrypt_with_public_key(&over_limit, &recipient.public_key());
        assert!(matches!(result, Err(Error::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_sealing_twice_differs() {
        // Fresh ephemeral pair per seal: identical payloads never produce
        // identical boxes
        let recipient = IdentityKeyPair::generate();

        let s1 = encrypt_with_public_key(b"same", &recipient.public_key()).unwrap();
        let s2 = encrypt_with_public_key(b"same", &recipient.public_key()).unwrap();

        assert_ne!(s1, s2);
    }
}
