//! # Storage Module
//!
//! Local durable storage for session keys.
//!
//! Only session keys are stored locally: identity key pairs live in process
//! memory for the lifetime of a login session, and messages live in the
//! directory service. See [`key_store::KeyStore`].

pub mod key_store;

pub use key_store::KeyStore;
