//! Key material resolution and ownership.
//!
//! A `SecretKey` is resolved once at construction time — from a configured
//! value when present, else from a fallback literal — and is immutable for
//! the lifetime of the process. Key material is held in a type that is
//! opaque, non-cloneable, and zeroised on drop. It is never logged,
//! serialized, or exposed outside the crate.
//!
//! ## Normalization
//!
//! The cipher and the token MAC both take a fixed 256-bit key. Configured
//! secrets of any length are normalized deterministically: shorter input is
//! right-padded with zero bytes, longer input is truncated.

use zeroize::Zeroize;

use crate::crypto::KEY_LEN;

/// A symmetric secret normalized to exactly [`KEY_LEN`] bytes.
///
/// - Not `Clone`. Cannot be duplicated without explicit reconstruction.
/// - Zeroised on drop. Memory is overwritten before deallocation.
pub struct SecretKey {
    bytes: [u8; KEY_LEN],
}

impl SecretKey {
    /// Construct a `SecretKey` from raw bytes.
    ///
    /// For keys sourced from configuration, prefer [`SecretKey::resolve`],
    /// which applies the pad-then-truncate normalization.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Resolve a key from an optionally configured secret string.
    ///
    /// Takes the configured value when present, else `fallback`. The
    /// fallback path is acceptable only outside production; a warning is
    /// emitted so deployments can flag it. Never fails.
    pub fn resolve(source: Option<&str>, fallback: &str) -> Self {
        let raw = match source {
            Some(value) => value,
            None => {
                tracing::warn!(
                    target: "tokenvault",
                    "no secret configured, falling back to a non-production default"
                );
                fallback
            }
        };
        Self::from_bytes(normalize(raw.as_bytes()))
    }

    /// Borrow the raw key bytes for use in MAC and AEAD operations.
    ///
    /// `pub(crate)` — raw bytes never leave the crate.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material must never appear in logs or debug output.
        f.write_str("SecretKey(..)")
    }
}

/// Right-pad with zero bytes, then truncate, to exactly [`KEY_LEN`] bytes.
fn normalize(raw: &[u8]) -> [u8; KEY_LEN] {
    let mut out = [0u8; KEY_LEN];
    let take = raw.len().min(KEY_LEN);
    out[..take].copy_from_slice(&raw[..take]);
    out
}
