//! # Message Envelope Codec
//!
//! Combines a plaintext, its digest, and a symmetric encryption result into
//! the wire/storage representation, and reverses the transform with
//! integrity verification on receipt.
//!
//! ## Envelope Encoding
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ENVELOPE ENCODING                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  seal(plaintext, key)                                                  │
//! │  ────────────────────                                                   │
//! │                                                                         │
//! │  digest   = SHA-256(plaintext)              (hex, 64 chars)            │
//! │  (ct, n)  = AES-256-GCM(key, plaintext)     (fresh random nonce)       │
//! │  envelope = base64(ct) ++ ":" ++ base64(n)                             │
//! │                                                                         │
//! │  The base64 alphabet never contains ':', so the two-part split is      │
//! │  unambiguous without length prefixes.                                  │
//! │                                                                         │
//! │  open(envelope, digest, key)                                           │
//! │  ───────────────────────────                                            │
//! │                                                                         │
//! │  parts      ≠ 2            → MalformedEnvelope                         │
//! │  AEAD fails                → DecryptionFailed                          │
//! │  digest mismatch           → verified = false  (NOT an error)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A digest mismatch does not imply decryption failure: the plaintext is
//! returned to the caller with `verified = false` and displayed as an
//! unverified message.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::crypto::hash::digest as hash_digest;
use crate::crypto::{Nonce, SessionKey};
use crate::error::{Error, Result};
use crate::messaging::{MessageRecord, MessageView};

/// Delimiter between the ciphertext and nonce parts of an envelope
const ENVELOPE_DELIMITER: char = ':';

/// The output of [`seal`]: everything the directory stores for one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    /// `base64(ciphertext):base64(nonce)`
    pub envelope: String,
    /// SHA-256 hex digest of the plaintext
    pub digest: String,
}

/// The output of [`open`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedMessage {
    /// The decrypted plaintext
    pub plaintext: Vec<u8>,
    /// Whether the recomputed digest matched the stored one
    pub verified: bool,
}

/// Encrypt and encode a plaintext for storage
pub fn seal(plaintext: &[u8], key: &SessionKey) -> Result<SealedMessage> {
    let digest = hash_digest(plaintext);
    let (ciphertext, nonce) = key.encrypt(plaintext)?;

    let envelope = format!(
        "{}{}{}",
        BASE64.encode(&ciphertext),
        ENVELOPE_DELIMITER,
        BASE64.encode(nonce.as_bytes())
    );

    Ok(SealedMessage { envelope, digest })
}

/// Decode, decrypt, and integrity-check a stored envelope
///
/// ## Errors
///
/// - `MalformedEnvelope` when the envelope does not split into exactly two
///   parts or a part is not valid base64
/// - `DecryptionFailed` when the key is wrong or the ciphertext corrupted
///
/// Both are per-message conditions; see [`open_all`] for the batch form
/// that converts them into [`MessageView::Undecryptable`].
pub fn open(envelope: &str, digest: &str, key: &SessionKey) -> Result<OpenedMessage> {
    let mut parts = envelope.split(ENVELOPE_DELIMITER);
    let (ct_part, nonce_part) = match (parts.next(), parts.next(), parts.next()) {
        (Some(ct), Some(nonce), None) => (ct, nonce),
        _ => {
            return Err(Error::MalformedEnvelope(
                "Envelope must be exactly two ':'-separated parts".into(),
            ))
        }
    };

    let ciphertext = BASE64
        .decode(ct_part)
        .map_err(|e| Error::MalformedEnvelope(format!("Invalid ciphertext base64: {}", e)))?;
    let nonce_bytes = BASE64
        .decode(nonce_part)
        .map_err(|e| Error::MalformedEnvelope(format!("Invalid nonce base64: {}", e)))?;
    let nonce = Nonce::from_slice(&nonce_bytes)?;

    let plaintext = key.decrypt(&ciphertext, &nonce)?;
    let verified = hash_digest(&plaintext) == digest;

    Ok(OpenedMessage { plaintext, verified })
}

/// Open a batch of stored records for presentation
///
/// Per-message crypto errors (`DecryptionFailed`, `MalformedEnvelope`)
/// become [`MessageView::Undecryptable`] and never abort the batch. Input
/// order is preserved; the directory returns records ascending by timestamp.
pub fn open_all(records: &[MessageRecord], key: &SessionKey) -> Vec<MessageView> {
    records
        .iter()
        .map(|record| match open(&record.envelope, &record.digest, key) {
            Ok(opened) => MessageView::Readable {
                id: record.id.clone(),
                sender: record.sender.clone(),
                text: String::from_utf8_lossy(&opened.plaintext).into_owned(),
                verified: opened.verified,
                timestamp: record.timestamp,
            },
            Err(err) => {
                tracing::warn!(
                    message_id = %record.id,
                    sender = %record.sender,
                    error = %err,
                    "Could not decrypt message"
                );
                MessageView::Undecryptable {
                    id: record.id.clone(),
                    sender: record.sender.clone(),
                    timestamp: record.timestamp,
                }
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
