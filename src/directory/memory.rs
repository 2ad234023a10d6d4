//! In-memory directory service.
//!
//! The reference [`Directory`] implementation, used by tests, demos, and
//! embedders that run both sides of a conversation in one process. State
//! lives in `parking_lot`-guarded maps; an outage switch lets tests exercise
//! `DirectoryUnavailable` propagation.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::directory::{Directory, DirectedKeyLookup, KeyRole};
use crate::error::{Error, Result};
use crate::messaging::MessageRecord;

/// In-memory store-and-forward directory
///
/// Identities become known on their first `put_public_key`; deleting the
/// key later marks them unreachable but keeps them known, matching a
/// registry where logout removes presence, not the account.
#[derive(Default)]
pub struct MemoryDirectory {
    /// username → published public key (hex). Presence = reachable.
    public_keys: RwLock<HashMap<String, String>>,
    /// usernames that have ever published a key
    known_identities: RwLock<HashSet<String>>,
    /// (sender, receiver) → sealed session key
    directed_keys: RwLock<HashMap<(String, String), String>>,
    /// all stored messages, append-only
    messages: RwLock<Vec<MessageRecord>>,
    /// simulated outage switch for tests
    unavailable: AtomicBool,
}

impl MemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a transport/storage outage
    ///
    /// While set, every operation fails with `DirectoryUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::DirectoryUnavailable(
                "simulated directory outage".into(),
            ));
        }
        Ok(())
    }

    fn check_known(&self, identity: &str) -> Result<()> {
        if self.known_identities.read().contains(identity) {
            Ok(())
        } else {
            Err(Error::IdentityNotFound(identity.to_string()))
        }
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn put_public_key(&self, identity: &str, public_key_hex: &str) -> Result<()> {
        self.check_available()?;
        self.known_identities.write().insert(identity.to_string());
        self.public_keys
            .write()
            .insert(identity.to_string(), public_key_hex.to_string());
        tracing::debug!(identity = identity, "Public key published");
        Ok(())
    }

    async fn get_public_key(&self, identity: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.public_keys.read().get(identity).cloned())
    }

    async fn delete_public_key(&self, identity: &str) -> Result<()> {
        self.check_available()?;
        self.public_keys.write().remove(identity);
        tracing::debug!(identity = identity, "Public key removed");
        Ok(())
    }

    async fn put_directed_key(
        &self,
        sender: &str,
        receiver: &str,
        sealed_key: &str,
    ) -> Result<()> {
        self.check_available()?;
        self.check_known(sender)?;
        self.check_known(receiver)?;
        self.directed_keys.write().insert(
            (sender.to_string(), receiver.to_string()),
            sealed_key.to_string(),
        );
        tracing::debug!(sender = sender, receiver = receiver, "Directed key stored");
        Ok(())
    }

    async fn lookup_directed_key(&self, local: &str, peer: &str) -> Result<DirectedKeyLookup> {
        self.check_available()?;
        let directed = self.directed_keys.read();

        // A record addressed to us is usable; one we published is not.
        if let Some(sealed) = directed.get(&(peer.to_string(), local.to_string())) {
            return Ok(DirectedKeyLookup::Found {
                role: KeyRole::Receiver,
                sealed_key: sealed.clone(),
            });
        }
        if let Some(sealed) = directed.get(&(local.to_string(), peer.to_string())) {
            return Ok(DirectedKeyLookup::Found {
                role: KeyRole::Sender,
                sealed_key: sealed.clone(),
            });
        }
        Ok(DirectedKeyLookup::Absent)
    }

    async fn put_message(
        &self,
        sender: &str,
        receiver: &str,
        envelope: &str,
        digest: &str,
    ) -> Result<String> {
        self.check_available()?;
        self.check_known(sender)?;
        self.check_known(receiver)?;

        let record = MessageRecord::new(sender, receiver, envelope, digest);
        let id = record.id.clone();
        self.messages.write().push(record);
        Ok(id)
    }

    async fn get_messages(&self, a: &str, b: &str) -> Result<Vec<MessageRecord>> {
        self.check_available()?;
        let mut records: Vec<MessageRecord> = self
            .messages
            .read()
            .iter()
            .filter(|m| {
                (m.sender == a && m.receiver == b) || (m.sender == b && m.receiver == a)
            })
            .cloned()
            .collect();
        records.sort_by_key(|m| m.timestamp);
        Ok(records)
    }

    async fn list_reachable(&self, excluding: Option<&str>) -> Result<Vec<String>> {
        self.check_available()?;
        let mut reachable: Vec<String> = self
            .public_keys
            .read()
            .keys()
            .filter(|name| excluding != Some(name.as_str()))
            .cloned()
            .collect();
        reachable.sort();
        Ok(reachable)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_public_key_lifecycle() {
        let dir = MemoryDirectory::new();

        assert_eq!(dir.get_public_key("alice").await.unwrap(), None);

        dir.put_public_key("alice", "aabb").await.unwrap();
        assert_eq!(
            dir.get_public_key("alice").await.unwrap(),
            Some("aabb".to_string())
        );

        dir.delete_public_key("alice").await.unwrap();
        assert_eq!(dir.get_public_key("alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_reachable_excludes_self_and_logged_out() {
        let dir = MemoryDirectory::new();
        dir.put_public_key("alice", "a").await.unwrap();
        dir.put_public_key("bob", "b").await.unwrap();
        dir.put_public_key("carol", "c").await.unwrap();
        dir.delete_public_key("carol").await.unwrap();

        let reachable = dir.list_reachable(Some("alice")).await.unwrap();
        assert_eq!(reachable, vec!["bob".to_string()]);
    }

    #[tokio::test]
    async fn test_directed_key_roles() {
        let dir = MemoryDirectory::new();
        dir.put_public_key("alice", "a").await.unwrap();
        dir.put_public_key("bob", "b").await.unwrap();

        assert_eq!(
            dir.lookup_directed_key("bob", "alice").await.unwrap(),
            DirectedKeyLookup::Absent
        );

        dir.put_directed_key("alice", "bob", "sealed").await.unwrap();

        // Bob is the receiver of alice→bob
        assert_eq!(
            dir.lookup_directed_key("bob", "alice").await.unwrap(),
            DirectedKeyLookup::Found {
                role: KeyRole::Receiver,
                sealed_key: "sealed".into(),
            }
        );
        // Alice is the sender of her own record
        assert_eq!(
            dir.lookup_directed_key("alice", "bob").await.unwrap(),
            DirectedKeyLookup::Found {
                role: KeyRole::Sender,
                sealed_key: "sealed".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_receiver_record_takes_precedence() {
        let dir = MemoryDirectory::new();
        dir.put_public_key("alice", "a").await.unwrap();
        dir.put_public_key("bob", "b").await.unwrap();

        dir.put_directed_key("alice", "bob", "from-alice").await.unwrap();
        dir.put_directed_key("bob", "alice", "from-bob").await.unwrap();

        // With records in both directions, each side sees the one it can open
        let lookup = dir.lookup_directed_key("alice", "bob").await.unwrap();
        assert_eq!(
            lookup,
            DirectedKeyLookup::Found {
                role: KeyRole::Receiver,
                sealed_key: "from-bob".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_directed_key_requires_known_identities() {
        let dir = MemoryDirectory::new();
        dir.put_public_key("alice", "a").await.unwrap();

        let result = dir.put_directed_key("alice", "ghost", "sealed").await;
        assert!(matches!(result, Err(Error::IdentityNotFound(_))));
    }

    #[tokio::test]
    async fn test_messages_ordered_ascending_both_directions() {
        let dir = MemoryDirectory::new();
        dir.put_public_key("alice", "a").await.unwrap();
        dir.put_public_key("bob", "b").await.unwrap();
        dir.put_public_key("carol", "c").await.unwrap();

        dir.put_message("alice", "bob", "e1", "d1").await.unwrap();
        dir.put_message("bob", "alice", "e2", "d2").await.unwrap();
        dir.put_message("alice", "carol", "other", "d").await.unwrap();
        dir.put_message("alice", "bob", "e3", "d3").await.unwrap();

        let records = dir.get_messages("alice", "bob").await.unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert!(records.iter().all(|m| m.envelope != "other"));
    }

    #[tokio::test]
    async fn test_outage_propagates_as_unavailable() {
        let dir = MemoryDirectory::new();
        dir.put_public_key("alice", "a").await.unwrap();

        dir.set_unavailable(true);
        let result = dir.get_public_key("alice").await;
        assert!(matches!(result, Err(Error::DirectoryUnavailable(_))));

        dir.set_unavailable(false);
        assert!(dir.get_public_key("alice").await.is_ok());
    }
}
