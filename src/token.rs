//! Token construction and verification.
//!
//! A token is a one-way binding of a request to the instance serving it
//! and the data item it authorizes: the digest covers
//! `(request_id, instance_id, nonce, timestamp, data_key)` and is keyed by
//! the vault's token secret. Verification is stateless — it recomputes the
//! digest from the fields the caller presents and compares in constant
//! time. No token is ever stored.
//!
//! Fields are encoded into the digest input with an explicit length prefix
//! per field, so no two distinct field tuples can produce the same input
//! bytes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto;
use crate::keys::SecretKey;

/// The output of token generation. The caller presents the whole envelope
/// (alongside the original context fields) at verification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEnvelope {
    /// 64-character lowercase hex digest binding the request context.
    pub token: String,
    /// Unique random nonce drawn at generation time.
    pub nonce: String,
    /// Generation time, integer seconds since the Unix epoch.
    pub timestamp: i64,
}

/// Generate a token binding `(request_id, instance_id, data_key)` at the
/// given instant.
///
/// Draws a fresh UUIDv4 nonce per call. The same six inputs — the three
/// context fields, the nonce, the timestamp, and the secret — always
/// reproduce the identical digest, which is what makes stateless
/// verification possible.
pub fn generate(
    request_id: &str,
    instance_id: &str,
    data_key: &str,
    secret: &SecretKey,
    now: i64,
) -> TokenEnvelope {
    let nonce = Uuid::new_v4().to_string();
    let message = binding_message(request_id, instance_id, &nonce, now, data_key);
    let token = crypto::binding_digest(secret.as_bytes(), &message);

    TokenEnvelope {
        token,
        nonce,
        timestamp: now,
    }
}

/// Verify a token against the context fields the caller presents.
///
/// Recomputes the digest over the caller-supplied fields and compares it
/// to `token` in constant time. Returns `true` iff they match. A malformed
/// token (not hex, wrong length) is simply not a match — never an error.
///
/// Expiry is a separate check; see [`crate::expiry`].
pub fn verify(
    token: &str,
    request_id: &str,
    instance_id: &str,
    data_key: &str,
    nonce: &str,
    timestamp: i64,
    secret: &SecretKey,
) -> bool {
    let message = binding_message(request_id, instance_id, nonce, timestamp, data_key);
    crypto::verify_binding_digest(secret.as_bytes(), &message, token)
}

/// Encode the binding tuple as digest input.
///
/// Each field is prefixed with its byte length as a big-endian u32, in the
/// fixed order `(request_id, instance_id, nonce, timestamp, data_key)`.
/// The timestamp is rendered as its decimal string. The length prefixes
/// make the encoding injective: `("ab", "c")` and `("a", "bc")` produce
/// different input bytes.
fn binding_message(
    request_id: &str,
    instance_id: &str,
    nonce: &str,
    timestamp: i64,
    data_key: &str,
) -> Vec<u8> {
    let timestamp = timestamp.to_string();
    let fields = [request_id, instance_id, nonce, timestamp.as_str(), data_key];

    let total: usize = fields.iter().map(|f| 4 + f.len()).sum();
    let mut message = Vec::with_capacity(total);
    for field in fields {
        message.extend_from_slice(&(field.len() as u32).to_be_bytes());
        message.extend_from_slice(field.as_bytes());
    }
    message
}
