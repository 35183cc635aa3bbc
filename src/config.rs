//! Process configuration.
//!
//! All configuration is resolved once at startup. The secrets configured
//! here are raw strings; normalization into key material happens in
//! [`crate::keys`]. Absent values fall back to fixed non-secret defaults
//! that are acceptable only outside production.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::expiry;

/// Environment variable holding the token-binding secret.
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";
/// Environment variable holding the payload-encryption key.
pub const ENV_ENCRYPTION_KEY: &str = "ENCRYPTION_KEY";
/// Environment variable holding the audit log destination path.
pub const ENV_AUDIT_LOG_FILE: &str = "AUDIT_LOG_FILE";
/// Environment variable holding the token acceptance window in seconds.
pub const ENV_TOKEN_MAX_AGE: &str = "TOKEN_MAX_AGE";

/// Fallback token secret. Flag any deployment still running on this.
pub(crate) const DEFAULT_SECRET_KEY: &str = "default_secret_key";
/// Fallback payload-encryption key. Flag any deployment still running on this.
pub(crate) const DEFAULT_ENCRYPTION_KEY: &str = "default_encryption_key";

/// Startup configuration for a [`crate::TokenVault`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Token-binding secret. `None` falls back to a non-production default.
    pub secret_key: Option<String>,
    /// Payload-encryption key. `None` falls back to a non-production default.
    pub encryption_key: Option<String>,
    /// Where to append audit events as JSON lines. `None` keeps the audit
    /// trail in memory only.
    pub audit_log_file: Option<PathBuf>,
    /// Maximum token age accepted at verification.
    pub token_max_age_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_key: None,
            encryption_key: None,
            audit_log_file: None,
            token_max_age_secs: expiry::DEFAULT_MAX_AGE_SECS,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup. This is the
    /// injection seam `from_env` goes through; tests supply a map instead
    /// of the real environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let token_max_age_secs = match lookup(ENV_TOKEN_MAX_AGE) {
            Some(raw) => match raw.parse::<i64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(
                        target: "tokenvault",
                        value = %raw,
                        "invalid TOKEN_MAX_AGE, using default window"
                    );
                    expiry::DEFAULT_MAX_AGE_SECS
                }
            },
            None => expiry::DEFAULT_MAX_AGE_SECS,
        };

        Self {
            secret_key: lookup(ENV_SECRET_KEY).filter(|v| !v.is_empty()),
            encryption_key: lookup(ENV_ENCRYPTION_KEY).filter(|v| !v.is_empty()),
            audit_log_file: lookup(ENV_AUDIT_LOG_FILE)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            token_max_age_secs,
        }
    }
}
