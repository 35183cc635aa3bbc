//! # tokenvault
//!
//! Request-scoped proof tokens and sealed payload storage.
//!
//! A [`TokenVault`] issues short-lived tokens binding a request to the
//! instance serving it and the data item it authorizes, verifies presented
//! tokens against tampering and expiry, and encrypts payload values at
//! rest as self-contained authenticated blobs. Every operation outcome is
//! reported to a pluggable audit log.
//!
//! Verification is stateless — derived entirely from the inputs presented
//! at verify time — so the same valid envelope verifies repeatedly within
//! its acceptance window. Single-use semantics require a seen-nonce store
//! layered on top by the caller.
//!
//! ## Public API
//!
//! The public surface of this crate is intentionally narrow. Construct a
//! [`TokenVault`] (from explicit keys or [`Config`]) and use its four
//! operations; the `audit` module is public for implementing custom sinks.

// Module declarations.
pub(crate) mod crypto;
pub mod audit;
pub mod config;
pub mod error;
pub mod expiry;
pub mod keys;
pub mod token;
pub mod vault;

pub use config::Config;
pub use crypto::{KEY_LEN, NONCE_LEN};
pub use error::TokenVaultError;
pub use keys::SecretKey;
pub use token::TokenEnvelope;
pub use vault::TokenVault;
