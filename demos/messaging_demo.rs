//! # Messaging Demo
//!
//! This example walks the full first-contact scenario:
//! 1. Alice and Bob log in (key pairs generated, public keys published)
//! 2. Alice sends "hello" — a session key is generated, sealed for Bob,
//!    and published as a directed record
//! 3. Bob polls, recovers the session key, decrypts, and verifies
//! 4. Demonstrates the unverified-digest trust signal
//!
//! ## Run
//!
//! ```bash
//! cargo run --example messaging_demo
//! ```

use std::sync::Arc;

use sotto_core::{ChatConfig, ChatSession, Directory, KeyStore, MemoryDirectory, MessageView};

#[tokio::main(flavor = "current_thread")]
async fn main() -> sotto_core::Result<()> {
    println!("=================================================");
    println!("           SOTTO MESSAGING DEMO");
    println!("=================================================\n");

    let directory = Arc::new(MemoryDirectory::new());

    // =========================================================================
    // STEP 1: Alice and Bob log in
    // =========================================================================
    println!("1. Logging in Alice and Bob...\n");

    let alice = ChatSession::login(
        "alice",
        directory.clone() as Arc<dyn Directory>,
        Arc::new(KeyStore::new()),
        ChatConfig::default(),
    )
    .await?;
    let bob = ChatSession::login(
        "bob",
        directory.clone() as Arc<dyn Directory>,
        Arc::new(KeyStore::new()),
        ChatConfig::default(),
    )
    .await?;

    println!("   Alice's public key: {}...", &alice.public_key().to_hex()[..16]);
    println!("   Bob's public key:   {}...", &bob.public_key().to_hex()[..16]);
    println!("   Reachable peers for Alice: {:?}\n", alice.list_peers().await?);

    // =========================================================================
    // STEP 2: Alice sends the first message
    // =========================================================================
    println!("2. Alice sends \"hello\" (session key generated + sealed for Bob)...\n");

    let message_id = alice.send_message("bob", "hello").await?;
    println!("   Stored message id: {}", message_id);

    let stored = directory.get_messages("alice", "bob").await?;
    println!("   Directory sees only ciphertext: {}...", &stored[0].envelope[..24]);
    println!("   ...and the plaintext digest:    {}...\n", &stored[0].digest[..16]);

    // =========================================================================
    // STEP 3: Bob fetches and decrypts
    // =========================================================================
    println!("3. Bob fetches the conversation...\n");

    for view in bob.fetch_conversation("alice").await? {
        match view {
            MessageView::Readable {
                sender,
                text,
                verified,
                ..
            } => {
                let marker = if verified { "✓ verified" } else { "⚠ unverified" };
                println!("   [{}] {}  ({})", sender, text, marker);
            }
            MessageView::Undecryptable { sender, .. } => {
                println!("   [{}] <could not decrypt>", sender);
            }
        }
    }

    // =========================================================================
    // STEP 4: Logout makes Alice unreachable
    // =========================================================================
    println!("\n4. Alice logs out...\n");

    alice.logout().await?;
    match bob.send_message("alice", "still there?").await {
        Err(err) => println!("   Bob's send fails as expected: {}", err),
        Ok(_) => println!("   Unexpected: send succeeded"),
    }

    println!("\nDone.");
    Ok(())
}
