//! # Chat Session
//!
//! The user-facing surface of the core: one [`ChatSession`] per login.
//!
//! ## Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SESSION LIFECYCLE                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  1. Login                                                               │
//! │     ┌─────────────┐                                                    │
//! │     │ ChatSession │──► Validate username (≥ 3 chars)                   │
//! │     │ ::login()   │──► Generate identity key pair                      │
//! │     └─────────────┘──► Publish public key (now reachable)              │
//! │            │                                                           │
//! │            ▼                                                           │
//! │  2. Active                                                             │
//! │     ┌─────────────┐                                                    │
//! │     │  send /     │◄─► obtain session key per peer                     │
//! │     │  fetch /    │◄─► seal / open envelopes                           │
//! │     │  watch      │◄─► poll the directory on an interval               │
//! │     └─────────────┘                                                    │
//! │            │                                                           │
//! │            ▼                                                           │
//! │  3. Logout (consumes the session)                                      │
//! │     ┌─────────────┐                                                    │
//! │     │ logout()    │──► Unpublish public key (now unreachable)          │
//! │     │             │──► Clear the session-key cache                     │
//! │     └─────────────┘──► Drop the key pair (private half destroyed)      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The identity key pair exists only between login and logout and never
//! leaves process memory. Session keys, by contrast, persist in the
//! durable key store across sessions.

pub mod poll;

use std::sync::Arc;

use crate::crypto::{IdentityKeyPair, IdentityPublicKey};
use crate::directory::Directory;
use crate::error::{Error, Result};
use crate::exchange::KeyExchange;
use crate::messaging::{envelope, MessageView};
use crate::storage::KeyStore;
use crate::ChatConfig;

pub use poll::ConversationWatcher;

/// Minimum username length in characters
pub const MIN_USERNAME_LEN: usize = 3;

/// A logged-in identity
///
/// Holds the per-session key pair and the key exchange coordinator. Drop
/// or [`ChatSession::logout`] destroys the private key; only `logout`
/// also unpublishes the public key.
pub struct ChatSession {
    username: String,
    keypair: Arc<IdentityKeyPair>,
    directory: Arc<dyn Directory>,
    exchange: Arc<KeyExchange>,
    config: ChatConfig,
}

impl ChatSession {
    /// Log in as `username`: generate a key pair and publish its public half
    ///
    /// ## Errors
    ///
    /// - `InvalidUsername` when the name is shorter than
    ///   [`MIN_USERNAME_LEN`] characters
    /// - Directory errors from publishing the public key
    pub async fn login(
        username: impl Into<String>,
        directory: Arc<dyn Directory>,
        key_store: Arc<KeyStore>,
        config: ChatConfig,
    ) -> Result<Self> {
        let username = username.into();
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(Error::InvalidUsername(format!(
                "'{}' is shorter than {} characters",
                username, MIN_USERNAME_LEN
            )));
        }

        let keypair = Arc::new(IdentityKeyPair::generate());
        directory
            .put_public_key(&username, &keypair.public_key().to_hex())
            .await?;
        tracing::info!(username = %username, "Logged in, public key published");

        let exchange = Arc::new(KeyExchange::new(
            username.clone(),
            keypair.clone(),
            directory.clone(),
            key_store,
        ));

        Ok(Self {
            username,
            keypair,
            directory,
            exchange,
            config,
        })
    }

    /// The local username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The published public key
    pub fn public_key(&self) -> IdentityPublicKey {
        self.keypair.public_key()
    }

    /// The key exchange coordinator (for callers driving it directly)
    pub fn exchange(&self) -> &KeyExchange {
        &self.exchange
    }

    /// Encrypt and store a message for `peer`, returning the message id
    pub async fn send_message(&self, peer: &str, text: &str) -> Result<String> {
        let key = self.exchange.obtain_session_key(peer).await?;
        let sealed = envelope::seal(text.as_bytes(), &key)?;
        let id = self
            .directory
            .put_message(&self.username, peer, &sealed.envelope, &sealed.digest)
            .await?;
        tracing::debug!(peer = peer, message_id = %id, "Message stored");
        Ok(id)
    }

    /// Fetch and decrypt the conversation with `peer`, ascending by time
    ///
    /// Undecryptable messages are reported per record, never as a failure
    /// of the whole fetch.
    pub async fn fetch_conversation(&self, peer: &str) -> Result<Vec<MessageView>> {
        fetch_conversation(&self.exchange, &*self.directory, &self.username, peer).await
    }

    /// List reachable identities, excluding ourselves
    pub async fn list_peers(&self) -> Result<Vec<String>> {
        self.directory.list_reachable(Some(&self.username)).await
    }

    /// Start polling the conversation with `peer`
    ///
    /// Returns a watcher delivering decrypted snapshots at the configured
    /// interval; stop it (or drop it) when the view loses focus.
    pub fn watch_conversation(&self, peer: &str) -> ConversationWatcher {
        ConversationWatcher::spawn(
            self.exchange.clone(),
            self.directory.clone(),
            self.username.clone(),
            peer.to_string(),
            self.config.poll_interval,
        )
    }

    /// Log out: unpublish the public key and destroy the key pair
    ///
    /// Consumes the session; the identity becomes unreachable until the
    /// next login generates a fresh pair.
    pub async fn logout(self) -> Result<()> {
        self.directory.delete_public_key(&self.username).await?;
        self.exchange.clear();
        tracing::info!(username = %self.username, "Logged out, public key removed");
        Ok(())
    }
}

/// Shared fetch path for [`ChatSession::fetch_conversation`] and the poller
pub(crate) async fn fetch_conversation(
    exchange: &KeyExchange,
    directory: &dyn Directory,
    local: &str,
    peer: &str,
) -> Result<Vec<MessageView>> {
    let key = exchange.obtain_session_key(peer).await?;
    let records = directory.get_messages(local, peer).await?;
    Ok(envelope::open_all(&records, &key))
}

// ============================================================================
// TESTS
// ============================================================================
