//! # Messaging Module
//!
//! The encrypted message data model and the envelope codec.
//!
//! ## Wire/Storage Shape
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      MESSAGE RECORD FORMAT                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  MessageRecord (as stored by the directory)                            │
//! │  ──────────────────────────────────────────                             │
//! │  {                                                                      │
//! │    "id": "uuid-v4",               // Unique message ID                  │
//! │    "sender": "alice",             // Sender username                    │
//! │    "receiver": "bob",             // Receiver username                  │
//! │    "envelope": "b64ct:b64nonce",  // Encrypted body (see envelope.rs)   │
//! │    "digest": "hex...",            // SHA-256 of the plaintext           │
//! │    "timestamp": 1234567890123     // Unix timestamp (ms)                │
//! │  }                                                                      │
//! │                                                                         │
//! │  Records are immutable once created and ordered ascending by           │
//! │  timestamp within a conversation (unordered sender/receiver pair).     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decryption happens on the way *out* of the directory: [`MessageView`] is
//! the presentation form, where per-message crypto failures become an
//! `Undecryptable` marker instead of an error.

pub mod envelope;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use envelope::{open, open_all, seal, OpenedMessage, SealedMessage};

/// An encrypted message as relayed/stored by the directory service
///
/// Immutable once created. The core never inspects `envelope` or `digest`
/// beyond the codec in [`envelope`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageRecord {
    /// Unique message ID (UUID)
    pub id: String,
    /// Sender username
    pub sender: String,
    /// Receiver username
    pub receiver: String,
    /// Encoded ciphertext+nonce pair (see [`envelope::seal`])
    pub envelope: String,
    /// SHA-256 hex digest of the plaintext
    pub digest: String,
    /// Unix timestamp when stored (milliseconds)
    pub timestamp: i64,
}

impl MessageRecord {
    /// Create a new record with a fresh id and the current timestamp
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        envelope: impl Into<String>,
        digest: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: sender.into(),
            receiver: receiver.into(),
            envelope: envelope.into(),
            digest: digest.into(),
            timestamp: crate::time::now_timestamp_millis(),
        }
    }

    /// Check if this message was sent by `username`
    pub fn is_outgoing(&self, username: &str) -> bool {
        self.sender == username
    }
}

/// A decrypted message ready for presentation
///
/// Produced by [`envelope::open_all`]. One undecryptable record never
/// aborts the rest of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageView {
    /// Successfully decrypted message
    Readable {
        /// Message ID from the record
        id: String,
        /// Sender username
        sender: String,
        /// Decrypted text
        text: String,
        /// Whether the plaintext digest matched the stored digest
        ///
        /// `false` is a trust signal for the presentation layer, not an
        /// error: the message is still displayed, flagged as unverified.
        verified: bool,
        /// Unix timestamp (milliseconds)
        timestamp: i64,
    },
    /// The envelope could not be decrypted with the available session key
    /// (wrong key, tampering, or a malformed envelope)
    Undecryptable {
        /// Message ID from the record
        id: String,
        /// Sender username
        sender: String,
        /// Unix timestamp (milliseconds)
        timestamp: i64,
    },
}

impl MessageView {
    /// Get the text content if the message was readable
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Readable { text, .. } => Some(text),
            Self::Undecryptable { .. } => None,
        }
    }

    /// Check whether this message decrypted and its digest matched
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Readable { verified: true, .. })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_ids_are_unique() {
        let r1 = MessageRecord::new("alice", "bob", "e", "d");
        let r2 = MessageRecord::new("alice", "bob", "e", "d");
        assert_ne!(r1.id, r2.id);
    }

    #[test]
    fn test_record_is_outgoing() {
        let record = MessageRecord::new("alice", "bob", "e", "d");
        assert!(record.is_outgoing("alice"));
        assert!(!record.is_outgoing("bob"));
    }

    #[test]
    fn test_record_serialization_round_trip() {
        let record = MessageRecord::new("alice", "bob", "ct:nonce", "digest");
        let json = serde_json::to_string(&record).unwrap();
        let restored: MessageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, restored);
    }

    #[test]
    fn test_view_accessors() {
        let readable = MessageView::Readable {
            id: "1".into(),
            sender: "alice".into(),
            text: "hi".into(),
            verified: true,
            timestamp: 0,
        };
        assert_eq!(readable.as_text(), Some("hi"));
        assert!(readable.is_verified());

        let unverified = MessageView::Readable {
            id: "2".into(),
            sender: "alice".into(),
            text: "hi".into(),
            verified: false,
            timestamp: 0,
        };
        assert_eq!(unverified.as_text(), Some("hi"));
        assert!(!unverified.is_verified());

        let opaque = MessageView::Undecryptable {
            id: "3".into(),
            sender: "alice".into(),
            timestamp: 0,
        };
        assert_eq!(opaque.as_text(), None);
        assert!(!opaque.is_verified());
    }
}
