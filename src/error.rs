//! Error types for tokenvault.
//!
//! Every error variant is a distinct failure mode of the token and
//! sealing operations. Error messages are intentionally minimal — they
//! signal *what* failed without revealing *why* in ways that could leak
//! cryptographic state.

use std::fmt;

/// The single error type for all tokenvault operations.
#[derive(Debug)]
pub enum TokenVaultError {
    /// A required argument was empty or absent. The payload names the
    /// parameter. Raised before any cryptographic work is performed.
    MissingParameter(&'static str),

    /// A cryptographic key was invalid (wrong length, malformed, etc.).
    InvalidKey,

    /// Encryption failed. The underlying `ring` operation returned an error.
    EncryptionFailure,

    /// Decryption failed. This covers: undecodable blob, truncated blob,
    /// unknown blob version, wrong key, or tampered ciphertext. The cases
    /// are deliberately not distinguished.
    DecryptionFailure,

    /// The system's random number generator failed to produce bytes.
    RandomnessFailure,

    /// The configured audit log destination could not be opened.
    AuditLogUnavailable(String),
}

impl fmt::Display for TokenVaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParameter(name) => write!(f, "missing required parameter: {}", name),
            Self::InvalidKey => write!(f, "invalid key"),
            Self::EncryptionFailure => write!(f, "encryption failed"),
            Self::DecryptionFailure => write!(f, "decryption failed"),
            Self::RandomnessFailure => write!(f, "randomness source failed"),
            Self::AuditLogUnavailable(path) => {
                write!(f, "audit log destination unavailable: {}", path)
            }
        }
    }
}

impl std::error::Error for TokenVaultError {}
