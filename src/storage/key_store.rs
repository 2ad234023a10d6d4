//! # Session Key Store
//!
//! Local durable storage for session keys, scoped per local identity and
//! keyed by canonical pair id.
//!
//! ## Sharing Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      KEY STORE SHARING                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  One KeyStore models one browser-profile/device worth of durable       │
//! │  storage. Multiple sessions of the same identity ("tabs") share it     │
//! │  through an Arc handle:                                                │
//! │                                                                         │
//! │      tab 1 ──► Arc<KeyStore> ◄── tab 2                                 │
//! │                                                                         │
//! │  There is NO cross-handle coordination beyond the RwLock: two tabs     │
//! │  generating a key for the same peer race, and the last writer wins.    │
//! │  A new tab with a *separate* KeyStore (new device) has no local copy   │
//! │  at all — the coordinator then regenerates.                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values can optionally be encrypted at rest with a store-level key.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use parking_lot::RwLock;

use crate::crypto::{Nonce, SessionKey, NONCE_SIZE};
use crate::error::{Error, Result};

/// Local durable session-key storage
///
/// Entries persist until explicitly cleared; session keys have no expiry
/// or rotation.
#[derive(Default)]
pub struct KeyStore {
    /// `identity/pair_id` → stored value
    entries: RwLock<HashMap<String, String>>,
    /// Optional at-rest encryption key
    encryption_key: Option<SessionKey>,
}

impl KeyStore {
    /// Create a new plaintext key store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a key store that encrypts values at rest
    pub fn with_encryption(key: [u8; 32]) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            encryption_key: Some(SessionKey::from_bytes(key)),
        }
    }

    fn entry_key(identity: &str, pair_id: &str) -> String {
        format!("{}/{}", identity, pair_id)
    }

    /// Store an exported session key for `identity` under `pair_id`
    ///
    /// Overwrites any existing entry (last writer wins).
    pub fn store(&self, identity: &str, pair_id: &str, exported_key: &str) -> Result<()> {
        let value = if let Some(ref enc_key) = self.encryption_key {
            let (ciphertext, nonce) = enc_key.encrypt(exported_key.as_bytes())?;
            let mut sealed = nonce.as_bytes().to_vec();
            sealed.extend_from_slice(&ciphertext);
            BASE64.encode(sealed)
        } else {
            exported_key.to_string()
        };

        self.entries
            .write()
            .insert(Self::entry_key(identity, pair_id), value);
        Ok(())
    }

    /// Retrieve the exported session key for `identity` under `pair_id`
    pub fn retrieve(&self, identity: &str, pair_id: &str) -> Result<Option<String>> {
        let stored = self
            .entries
            .read()
            .get(&Self::entry_key(identity, pair_id))
            .cloned();

        let Some(stored) = stored else {
            return Ok(None);
        };

        if let Some(ref enc_key) = self.encryption_key {
            let sealed = BASE64
                .decode(&stored)
                .map_err(|e| Error::InvalidKey(format!("Corrupt key store entry: {}", e)))?;
            if sealed.len() < NONCE_SIZE {
                return Err(Error::InvalidKey("Corrupt key store entry".into()));
            }
            let nonce = Nonce::from_slice(&sealed[..NONCE_SIZE])?;
            let plaintext = enc_key.decrypt(&sealed[NONCE_SIZE..], &nonce)?;
            let exported = String::from_utf8(plaintext)
                .map_err(|_| Error::InvalidKey("Corrupt key store entry".into()))?;
            Ok(Some(exported))
        } else {
            Ok(Some(stored))
        }
    }

    /// Delete one stored key
    pub fn delete(&self, identity: &str, pair_id: &str) {
        self.entries
            .write()
            .remove(&Self::entry_key(identity, pair_id));
    }

    /// Remove every entry belonging to `identity`
    pub fn clear_identity(&self, identity: &str) {
        let prefix = format!("{}/", identity);
        self.entries
            .write()
            .retain(|key, _| !key.starts_with(&prefix));
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_retrieve_round_trip() {
        let store = KeyStore::new();
        let key = SessionKey::generate();

        store.store("alice", "alice:bob", &key.export()).unwrap();
        let retrieved = store.retrieve("alice", "alice:bob").unwrap().unwrap();

        assert_eq!(retrieved, key.export());
        let imported = SessionKey::import(&retrieved).unwrap();
        assert_eq!(imported.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_missing_entry_is_none() {
        let store = KeyStore::new();
        assert_eq!(store.retrieve("alice", "alice:bob").unwrap(), None);
    }

    #[test]
    fn test_entries_scoped_per_identity() {
        let store = KeyStore::new();
        store.store("alice", "alice:bob", "key-a").unwrap();
        store.store("bob", "alice:bob", "key-b").unwrap();

        assert_eq!(
            store.retrieve("alice", "alice:bob").unwrap(),
            Some("key-a".into())
        );
        assert_eq!(
            store.retrieve("bob", "alice:bob").unwrap(),
            Some("key-b".into())
        );
    }

    #[test]
    fn test_last_writer_wins() {
        let store = KeyStore::new();
        store.store("alice", "alice:bob", "first").unwrap();
        store.store("alice", "alice:bob", "second").unwrap();

        assert_eq!(
            store.retrieve("alice", "alice:bob").unwrap(),
            Some("second".into())
        );
    }

    #[test]
    fn test_clear_identity_removes_only_that_identity() {
        let store = KeyStore::new();
        store.store("alice", "alice:bob", "k1").unwrap();
        store.store("alice", "alice:carol", "k2").unwrap();
        store.store("bob", "alice:bob", "k3").unwrap();

        store.clear_identity("alice");

        assert_eq!(store.retrieve("alice", "alice:bob").unwrap(), None);
        assert_eq!(store.retrieve("alice", "alice:carol").unwrap(), None);
        assert_eq!(store.retrieve("bob", "alice:bob").unwrap(), Some("k3".into()));
    }

    #[test]
    fn test_encrypted_at_rest_round_trip() {
        let store = KeyStore::with_encryption([9u8; 32]);
        let key = SessionKey::generate();

        store.store("alice", "alice:bob", &key.export()).unwrap();

        // Raw entry must not contain the exported key
        let raw = store
            .entries
            .read()
            .get("alice/alice:bob")
            .cloned()
            .unwrap();
        assert_ne!(raw, key.export());

        let retrieved = store.retrieve("alice", "alice:bob").unwrap().unwrap();
        assert_eq!(retrieved, key.export());
    }

    #[test]
    fn test_delete_single_entry() {
        let store = KeyStore::new();
        store.store("alice", "alice:bob", "k").unwrap();
        store.delete("alice", "alice:bob");
        assert_eq!(store.retrieve("alice", "alice:bob").unwrap(), None);
    }
}
