//! Test utilities for bearer-token authentication tests.
//!
//! Provides:
//! - Deterministic Ed25519 keypairs for signing test tokens ([`TestKeypair`])
//! - A fluent claims builder ([`TokenBuilder`])
//! - Helpers for unsigned and hand-forged tokens
//!
//! # Usage
//!
//! ```rust,ignore
//! let keypair = TestKeypair::new(1, "test-key-01");
//! let token = keypair.sign(
//!     &TokenBuilder::new()
//!         .issuer("https://issuer.example.com/")
//!         .for_user("alice")
//!         .with_scp(&["read", "openid"])
//!         .build(),
//! );
//! ```

mod token_builders;

pub use token_builders::{forged_token, unsigned_token, TestKeypair, TokenBuilder};
