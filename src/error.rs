//! # Error Handling
//!
//! This module provides the error types for Sotto Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Identity Errors                                                   │
//! │  │   ├── InvalidUsername       - Username fails validation             │
//! │  │   └── NoIdentity            - Session already logged out            │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── EncryptionFailed      - Encryption operation failed           │
//! │  │   ├── DecryptionFailed      - Authenticated decryption failed       │
//! │  │   ├── InvalidKey            - Invalid key format/length             │
//! │  │   └── PayloadTooLarge       - Sealed-box input over the ceiling     │
//! │  │                                                                      │
//! │  ├── Envelope Errors                                                   │
//! │  │   └── MalformedEnvelope     - Stored envelope not two-part          │
//! │  │                                                                      │
//! │  ├── Exchange Errors                                                   │
//! │  │   └── PeerUnreachable       - Peer has no published public key      │
//! │  │                                                                      │
//! │  └── Directory Errors                                                  │
//! │      ├── IdentityNotFound      - Referenced identity absent            │
//! │      └── DirectoryUnavailable  - Transport/storage failure             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation Policy
//!
//! Crypto errors (`DecryptionFailed`, `MalformedEnvelope`) are caught at the
//! envelope codec boundary and converted into per-message values when a batch
//! of messages is opened — one undecryptable message never aborts the batch.
//! Exchange and directory errors propagate uncaught to the immediate caller:
//! a missing key or directory is fatal for that one operation, and retry
//! policy belongs to the caller.

use thiserror::Error;

/// Result type alias for Sotto Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Sotto Core
///
/// All errors are categorized by module/domain to make error handling
/// clearer and to provide meaningful error messages to users.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Identity Errors
    // ========================================================================

    /// Username fails validation (too short, empty)
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// The session has been logged out; its key pair is gone
    #[error("No identity loaded. The session has been logged out.")]
    NoIdentity,

    // ========================================================================
    // Crypto Errors
    // ========================================================================

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Authenticated decryption failed (wrong key, wrong nonce, or
    /// tampered ciphertext)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Invalid key format or length
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Sealed-box input exceeds the short-payload ceiling
    ///
    /// The asymmetric module only wraps session keys; bulk content must
    /// never be routed through it.
    #[error("Sealed-box payload of {size} bytes exceeds the {max}-byte ceiling")]
    PayloadTooLarge {
        /// Size of the rejected payload
        size: usize,
        /// The enforced ceiling
        max: usize,
    },

    // ========================================================================
    // Envelope Errors
    // ========================================================================

    /// Stored envelope does not match the two-part `ciphertext:nonce`
    /// encoding contract
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    // ========================================================================
    // Exchange Errors
    // ========================================================================

    /// Attempted key establishment with an identity that has no published
    /// public key
    #[error("Peer '{0}' is unreachable: no published public key")]
    PeerUnreachable(String),

    // ========================================================================
    // Directory Errors
    // ========================================================================

    /// A referenced identity does not exist in the directory
    #[error("Identity not found: {0}")]
    IdentityNotFound(String),

    /// The external directory/storage/transport failed
    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

impl Error {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors can potentially be resolved by retrying
    /// or by user action. The core performs no internal retries.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::DirectoryUnavailable(_) | Error::PeerUnreachable(_)
        )
    }

    /// Check if this error marks a single message as unreadable rather
    /// than failing the whole operation
    pub fn is_per_message(&self) -> bool {
        matches!(
            self,
            Error::DecryptionFailed(_) | Error::MalformedEnvelope(_)
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
