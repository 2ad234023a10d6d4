//! # Cryptography Module
//!
//! Cryptographic primitives used by Sotto Core.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 KEY LIFECYCLE                                   │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  Login                                                          │   │
//! │  │    │                                                            │   │
//! │  │    ▼                                                            │   │
//! │  │  IdentityKeyPair (X25519, per session)                          │   │
//! │  │    │  public half → published to the directory                  │   │
//! │  │    │  private half → process memory only                        │   │
//! │  │    ▼                                                            │   │
//! │  │  SessionKey (AES-256-GCM, per conversation pair)                │   │
//! │  │    │  created on first send/receive                             │   │
//! │  │    │  wrapped in a sealed box for the peer                      │   │
//! │  │    ▼                                                            │   │
//! │  │  Logout: key pair dropped, public key unpublished               │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 ENCRYPTION SCHEME                               │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  Key Wrapping (sealed box)                                     │   │
//! │  │  • Ephemeral-static X25519 + HKDF-SHA256 + AES-256-GCM         │   │
//! │  │  • Short payloads only (session keys)                          │   │
//! │  │                                                                 │   │
//! │  │  Message Encryption (AES-256-GCM)                              │   │
//! │  │  • 256-bit session key                                         │   │
//! │  │  • 96-bit nonce (random per message, generated internally)     │   │
//! │  │  • 128-bit authentication tag                                  │   │
//! │  │                                                                 │   │
//! │  │  Integrity Digest (SHA-256)                                    │   │
//! │  │  • Over plaintext, carried beside the envelope                 │   │
//! │  │  • Mismatch = unverified, not undecryptable                    │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices & Rationale
//!
//! | Algorithm | Purpose | Why Chosen |
//! |-----------|---------|------------|
//! | X25519 | Key wrapping | Fast ECDH, constant-time, small keys |
//! | AES-256-GCM | Encryption | Hardware acceleration, AEAD |
//! | HKDF-SHA256 | Key derivation | Industry standard, well-analyzed |
//! | SHA-256 | Digests | Deterministic across platforms |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: Secret keys are zeroized when dropped
//! 2. **Constant-Time Operations**: dalek for constant-time curve math
//! 3. **Secure Random**: `rand::rngs::OsRng` for all key and nonce material
//! 4. **No Nonce Reuse**: nonces are generated inside the encrypt path

pub mod encryption;
pub mod hash;
pub mod keys;

pub use encryption::{Nonce, SessionKey, KEY_SIZE, NONCE_SIZE};
pub use keys::{
    decrypt_with_private_key, encrypt_with_public_key, IdentityKeyPair, IdentityPublicKey,
    MAX_SEALED_PAYLOAD, PUBLIC_KEY_SIZE,
};
