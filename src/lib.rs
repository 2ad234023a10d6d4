//! # Sotto Core
//!
//! A demonstration end-to-end encrypted chat core. Two users who share
//! nothing but a store-and-forward relay bootstrap a confidential,
//! integrity-checked symmetric channel; the relay only ever sees public
//! keys, sealed key blobs, and ciphertext.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SOTTO CORE MODULES                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌──────────────┐   │
//! │  │   Session   │  │  Exchange   │  │  Messaging  │  │   Directory  │   │
//! │  │             │  │             │  │             │  │              │   │
//! │  │ - Login     │  │ - Obtain    │  │ - Seal/Open │  │ - Trait      │   │
//! │  │ - Send/Recv │  │   session   │  │ - Records   │  │ - In-memory  │   │
//! │  │ - Polling   │  │   key       │  │ - Views     │  │   impl       │   │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘  └──────┬───────┘   │
//! │         │                │                │                │           │
//! │         └────────────────┴────────────────┴────────────────┘           │
//! │                                   │                                     │
//! │  ┌─────────────┐  ┌─────────────┐ │                                     │
//! │  │   Crypto    │  │   Storage   │ │                                     │
//! │  │             │  │             │◄┘                                     │
//! │  │ - X25519    │  │ - Session   │                                       │
//! │  │ - AES-GCM   │  │   key store │                                       │
//! │  │ - SHA-256   │  │             │                                       │
//! │  └─────────────┘  └─────────────┘                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`crypto`] - Cryptographic primitives (digests, key pairs, session keys)
//! - [`directory`] - The external store-and-forward service, behind a trait
//! - [`storage`] - Durable local session-key storage
//! - [`exchange`] - The key exchange coordinator (the heart of the crate)
//! - [`messaging`] - Message records, views, and the envelope codec
//! - [`session`] - Login/logout lifecycle, sending, fetching, polling
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SECURITY LAYERS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Layer 1: Message Confidentiality (AES-256-GCM)                        │
//! │  ───────────────────────────────────────────────                        │
//! │  Every message body is encrypted under a per-pair session key with     │
//! │  a fresh random nonce. The directory stores ciphertext only.           │
//! │                                                                         │
//! │  Layer 2: Key Delivery (X25519 sealed box)                             │
//! │  ──────────────────────────────────────────                             │
//! │  A newly generated session key travels to the peer sealed under the    │
//! │  peer's published public key. Only the peer's in-memory private key    │
//! │  can open it — including against the sender itself.                    │
//! │                                                                         │
//! │  Layer 3: Plaintext Integrity (SHA-256 digest)                         │
//! │  ──────────────────────────────────────────────                         │
//! │  A digest of the plaintext rides beside the envelope. On receipt it    │
//! │  is recomputed and compared; a mismatch marks the message unverified   │
//! │  without suppressing it.                                               │
//! │                                                                         │
//! │  Out of scope: transport security (assumed from the channel), key      │
//! │  rotation/forward secrecy (a session key lives as long as the          │
//! │  conversation), and group chat.                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod crypto;
pub mod directory;
pub mod error;
pub mod exchange;
pub mod messaging;
pub mod session;
pub mod storage;
/// Time utilities backing message timestamps.
pub mod time;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use crypto::{IdentityKeyPair, IdentityPublicKey, SessionKey};
pub use directory::{Directory, DirectedKeyLookup, KeyRole, MemoryDirectory};
pub use error::{Error, Result};
pub use exchange::{canonical_pair_id, KeyExchange};
pub use messaging::{MessageRecord, MessageView};
pub use session::{ChatSession, ConversationWatcher};
pub use storage::KeyStore;

use std::time::Duration;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Default conversation poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Configuration for a chat session
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// How often conversation watchers re-fetch from the directory
    pub poll_interval: Duration,
    /// Enable verbose logging
    pub verbose_logging: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            verbose_logging: false,
        }
    }
}

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Sotto Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================
