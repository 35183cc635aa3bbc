//! Low-level cryptographic operations.
//!
//! This module is the only place in the crate that imports `ring`. All
//! other modules perform encryption, decryption, and digest computation
//! exclusively through the functions exposed here.
//!
//! Primitive choices:
//! - **Cipher**: AES-256-GCM (authenticated encryption)
//! - **Nonce**: 96-bit (12 bytes), generated fresh per operation via `SystemRandom`
//! - **Binding digest**: HMAC-SHA256, rendered lowercase hex
//! - **Key size**: 256 bits (32 bytes)

use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::TokenVaultError;

/// The AEAD algorithm used throughout tokenvault.
const ALGORITHM: &aead::Algorithm = &AES_256_GCM;

/// Size of the AEAD nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Size of a symmetric key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Leading version byte of every sealed blob. Bumped if the layout or
/// algorithm ever changes.
pub(crate) const BLOB_VERSION: u8 = 1;

/// Fill a buffer with cryptographically secure random bytes.
///
/// Uses `ring::rand::SystemRandom` — the only source of randomness in the
/// crate. A fresh nonce is generated for every sealing call. There is no
/// nonce caching or counter-based generation.
fn fill_random(buf: &mut [u8]) -> Result<(), TokenVaultError> {
    let rng = SystemRandom::new();
    rng.fill(buf).map_err(|_| TokenVaultError::RandomnessFailure)
}

/// Seal a plaintext payload using AES-256-GCM.
///
/// Returns the version byte and nonce prepended to the ciphertext. The
/// caller does not need to manage the nonce separately — it is bundled
/// with the output and extracted automatically during opening.
///
/// # Layout of returned bytes
/// ```text
/// [ version (1 byte) ][ nonce (12 bytes) ][ ciphertext + GCM tag ]
/// ```
pub(crate) fn seal(
    key_bytes: &[u8; KEY_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, TokenVaultError> {
    let unbound = UnboundKey::new(ALGORITHM, key_bytes).map_err(|_| TokenVaultError::InvalidKey)?;
    let key = LessSafeKey::new(unbound);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    fill_random(&mut nonce_bytes)?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| TokenVaultError::EncryptionFailure)?;

    let mut blob = Vec::with_capacity(1 + NONCE_LEN + in_out.len());
    blob.push(BLOB_VERSION);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&in_out);
    Ok(blob)
}

/// Open a sealed payload using AES-256-GCM.
///
/// Expects the input to be in the layout produced by `seal`: version byte,
/// nonce (12 bytes), then ciphertext and GCM tag.
///
/// If the key is wrong or the blob has been tampered with, the GCM
/// authentication check fails and this function returns an error. The
/// caller receives no partial plaintext, and the error does not reveal
/// which check failed.
pub(crate) fn open(key_bytes: &[u8; KEY_LEN], blob: &[u8]) -> Result<Vec<u8>, TokenVaultError> {
    let min_len = 1 + NONCE_LEN + ALGORITHM.tag_len();
    if blob.len() < min_len || blob[0] != BLOB_VERSION {
        return Err(TokenVaultError::DecryptionFailure);
    }

    let nonce_bytes: [u8; NONCE_LEN] = blob[1..1 + NONCE_LEN]
        .try_into()
        .map_err(|_| TokenVaultError::DecryptionFailure)?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let unbound = UnboundKey::new(ALGORITHM, key_bytes).map_err(|_| TokenVaultError::InvalidKey)?;
    let key = LessSafeKey::new(unbound);

    let mut payload = blob[1 + NONCE_LEN..].to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::empty(), &mut payload)
        .map_err(|_| TokenVaultError::DecryptionFailure)?;

    Ok(plaintext.to_vec())
}

/// Compute the binding digest over a message: HMAC-SHA256 under the given
/// key, rendered as lowercase hex.
pub(crate) fn binding_digest(key_bytes: &[u8; KEY_LEN], message: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key_bytes);
    let tag = hmac::sign(&key, message);
    hex::encode(tag.as_ref())
}

/// Verify a hex-rendered binding digest against a message in constant time.
///
/// A digest that is not valid hex, or has the wrong length, is simply not
/// a match. The comparison of well-formed digests goes through
/// `ring::hmac::verify`, which is fixed-time with respect to the tag bytes.
pub(crate) fn verify_binding_digest(
    key_bytes: &[u8; KEY_LEN],
    message: &[u8],
    digest_hex: &str,
) -> bool {
    let provided = match hex::decode(digest_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let key = hmac::Key::new(hmac::HMAC_SHA256, key_bytes);
    hmac::verify(&key, message, &provided).is_ok()
}
