//! # Directory Service
//!
//! The external store-and-forward collaborator, abstracted behind a trait.
//!
//! ## Responsibilities
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       DIRECTORY SERVICE                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Public keys     username → hex public key                             │
//! │                  presence of a key = "reachable/online"                │
//! │                                                                         │
//! │  Directed keys   (sender, receiver) → sealed session key               │
//! │                  one-time delivery artifact, NOT canonical storage     │
//! │                                                                         │
//! │  Messages        (sender, receiver) → envelope + digest + timestamp    │
//! │                  returned ascending by timestamp per pair              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core never interprets directory internals (storage format, transport
//! encoding). Every error surfaced by an implementation is either
//! `IdentityNotFound` (a referenced identity is absent) or
//! `DirectoryUnavailable` (transport/storage failure). No retries happen
//! below this trait; retry policy belongs to the caller.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::messaging::MessageRecord;

pub use memory::MemoryDirectory;

/// Which side of a directed key record the local identity is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// The local identity created and published this record
    Sender,
    /// This record was sealed *for* the local identity
    Receiver,
}

/// Result of looking up a directed session-key record for a pair
///
/// An explicit tagged type: the role decides whether the sealed payload is
/// recoverable locally (only a `Receiver` can unseal it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectedKeyLookup {
    /// A record exists for this pair
    Found {
        /// The local identity's side of the record
        role: KeyRole,
        /// The sealed session key, opaque to the directory
        sealed_key: String,
    },
    /// No record exists in either direction
    Absent,
}

/// The directory service consumed by the core
///
/// Implementations relay/store opaque strings; all crypto happens on the
/// client side of this trait.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Publish `identity`'s public key, marking it reachable
    async fn put_public_key(&self, identity: &str, public_key_hex: &str) -> Result<()>;

    /// Fetch `identity`'s published public key, or `None` if unreachable
    async fn get_public_key(&self, identity: &str) -> Result<Option<String>>;

    /// Remove `identity`'s published public key, marking it unreachable
    async fn delete_public_key(&self, identity: &str) -> Result<()>;

    /// Publish a directed sealed-key record from `sender` to `receiver`
    ///
    /// Fails with `IdentityNotFound` if either identity is unknown.
    async fn put_directed_key(
        &self,
        sender: &str,
        receiver: &str,
        sealed_key: &str,
    ) -> Result<()>;

    /// Look up a directed key record between `local` and `peer`
    ///
    /// Checks both orderings and reports which side `local` is on.
    /// A record addressed *to* `local` takes precedence over one `local`
    /// published itself.
    async fn lookup_directed_key(&self, local: &str, peer: &str) -> Result<DirectedKeyLookup>;

    /// Store an encrypted message, returning its id
    ///
    /// Fails with `IdentityNotFound` if either identity is unknown.
    async fn put_message(
        &self,
        sender: &str,
        receiver: &str,
        envelope: &str,
        digest: &str,
    ) -> Result<String>;

    /// Fetch all messages between `a` and `b` (either direction),
    /// ascending by timestamp
    async fn get_messages(&self, a: &str, b: &str) -> Result<Vec<MessageRecord>>;

    /// List identities with a currently-published public key
    async fn list_reachable(&self, excluding: Option<&str>) -> Result<Vec<String>>;
}
