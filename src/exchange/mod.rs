//! # Key Exchange Coordinator
//!
//! For a given local identity and peer, produces or retrieves the shared
//! session key, persisting it locally and — if newly created — transmitting
//! it to the peer as a sealed box via the directory service.
//!
//! ## State Machine
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              SESSION KEY STATES (per local identity + peer)             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   NoKey ──────────► PendingFetch ──────────► Established               │
//! │     │                    │                        ▲                     │
//! │     │                    │ no directed record,    │                     │
//! │     │                    │ or record we sealed    │                     │
//! │     │                    │ ourselves              │                     │
//! │     │                    ▼                        │                     │
//! │     │              generate fresh key ────────────┤                     │
//! │     │              + publish sealed record        │                     │
//! │     │                                             │                     │
//! │     └── LocalKey (durable store hit) ─────────────┘                     │
//! │                                                                         │
//! │  "Established" is entered optimistically the moment a key is           │
//! │  available — there is no handshake acknowledgment.                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lookup Order
//!
//! 1. In-memory cache (this process)
//! 2. Durable key store under the canonical pair id (this device)
//! 3. Directed record in the directory, if addressed *to* us — a record we
//!    published ourselves is sealed for the peer and unrecoverable, so it
//!    counts as absent
//! 4. Generate, persist, seal for the peer, publish
//!
//! ## Known Hazard
//!
//! When both sides run steps 3–4 concurrently before either has discovered
//! the other's record, each generates and publishes an independent key and
//! the two sides diverge. There is no tie-break or negotiation step; each
//! side keeps preferring its own durable copy. Re-keying requires clearing
//! local state.
//!
//! A failed first contact diverges the same way: a key generated before a
//! `PeerUnreachable` failure is kept locally but never republished, since
//! retries answer from steps 1–2 and never reach the publish step again.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::crypto::{
    decrypt_with_private_key, encrypt_with_public_key, IdentityKeyPair, IdentityPublicKey,
    SessionKey,
};
use crate::directory::{Directory, DirectedKeyLookup, KeyRole};
use crate::error::{Error, Result};
use crate::storage::KeyStore;

/// Order-independent identifier for a two-party conversation
///
/// Both sides key their durable session-key storage by this id.
pub fn canonical_pair_id(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}:{}", a, b)
    } else {
        format!("{}:{}", b, a)
    }
}

/// The key exchange coordinator for one local identity
///
/// Owns the in-memory session-key cache explicitly: the cache lives and
/// dies with this instance (cleared on logout), never as ambient global
/// state. Callers serialize `obtain_session_key` per peer through the
/// cache check; across processes of the same identity no lock exists and
/// the key store's last-writer-wins applies.
pub struct KeyExchange {
    /// Local username
    username: String,
    /// Local identity key pair (private half never leaves this process)
    keypair: Arc<IdentityKeyPair>,
    /// The external directory service
    directory: Arc<dyn Directory>,
    /// Durable per-device key storage, shared across tabs
    key_store: Arc<KeyStore>,
    /// In-memory cache, exclusively owned by this coordinator
    cache: RwLock<HashMap<String, SessionKey>>,
}

impl KeyExchange {
    /// Create a coordinator for `username`
    pub fn new(
        username: impl Into<String>,
        keypair: Arc<IdentityKeyPair>,
        directory: Arc<dyn Directory>,
        key_store: Arc<KeyStore>,
    ) -> Self {
        Self {
            username: username.into(),
            keypair,
            directory,
            key_store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Produce or retrieve the session key shared with `peer`
    ///
    /// Called whenever a message is about to be sent or decrypted.
    ///
    /// ## Errors
    ///
    /// - `PeerUnreachable` when a fresh key must be generated and `peer`
    ///   has no published public key
    /// - `DirectoryUnavailable` propagated from the directory, never
    ///   retried here
    pub async fn obtain_session_key(&self, peer: &str) -> Result<SessionKey> {
        let pair_id = canonical_pair_id(&self.username, peer);

        // 1. In-memory cache
        if let Some(key) = self.cache.read().get(&pair_id) {
            tracing::debug!(pair = %pair_id, "Session key cache hit");
            return Ok(key.clone());
        }

        // 2. Durable local storage
        if let Some(exported) = self.key_store.retrieve(&self.username, &pair_id)? {
            tracing::debug!(pair = %pair_id, "Session key loaded from key store");
            let key = SessionKey::import(&exported)?;
            self.cache.write().insert(pair_id, key.clone());
            return Ok(key);
        }

        // 3. Directed record in the directory
        match self.directory.lookup_directed_key(&self.username, peer).await? {
            DirectedKeyLookup::Found {
                role: KeyRole::Receiver,
                sealed_key,
            } => {
                tracing::info!(pair = %pair_id, "Recovering session key sealed for us");
                let payload = decrypt_with_private_key(&sealed_key, &self.keypair)?;
                let exported = String::from_utf8(payload).map_err(|_| {
                    Error::InvalidKey("Sealed session key is not valid UTF-8".into())
                })?;
                let key = SessionKey::import(&exported)?;
                self.key_store.store(&self.username, &pair_id, &exported)?;
                self.cache.write().insert(pair_id, key.clone());
                Ok(key)
            }
            DirectedKeyLookup::Found {
                role: KeyRole::Sender,
                ..
            } => {
                // We published this record in an earlier session/tab but no
                // longer hold a local copy. It is sealed for the peer, not
                // for us, so it cannot be recovered: same as having no key.
                tracing::info!(
                    pair = %pair_id,
                    "Own directed record found but unrecoverable; regenerating"
                );
                self.generate_and_publish(peer, &pair_id).await
            }
            DirectedKeyLookup::Absent => self.generate_and_publish(peer, &pair_id).await,
        }
    }

    /// Step 4: mint a fresh key, persist it, and ship it to the peer
    async fn generate_and_publish(&self, peer: &str, pair_id: &str) -> Result<SessionKey> {
        let key = SessionKey::generate();
        let exported = key.export();

        // Persisted before the peer fetch. If the fetch fails the key stays
        // local, and retries answer from cache or store without reaching
        // this step again, so no directed record is ever published for it.
        self.key_store.store(&self.username, pair_id, &exported)?;
        self.cache
            .write()
            .insert(pair_id.to_string(), key.clone());

        let peer_key_hex = self
            .directory
            .get_public_key(peer)
            .await?
            .ok_or_else(|| Error::PeerUnreachable(peer.to_string()))?;
        let peer_public = IdentityPublicKey::from_hex(&peer_key_hex)?;

        let sealed = encrypt_with_public_key(exported.as_bytes(), &peer_public)?;
        self.directory
            .put_directed_key(&self.username, peer, &sealed)
            .await?;

        tracing::info!(pair = %pair_id, peer = peer, "Generated and published session key");
        Ok(key)
    }

    /// Drop every cached key (logout path)
    ///
    /// Durable storage is left untouched; only this process forgets.
    pub fn clear(&self) {
        self.cache.write().clear();
        tracing::debug!(username = %self.username, "Session key cache cleared");
    }
}

// ============================================================================
// TESTS
// ============================================================================
