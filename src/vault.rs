//! The vault facade.
//!
//! [`TokenVault`] composes the token codec, the expiry policy, and the
//! payload cipher into the four public operations, validates input
//! presence, and reports every outcome to the audit log.
//!
//! A vault is an explicit instance constructed once at process start and
//! threaded through call sites. There is no process-wide singleton;
//! tests construct isolated vaults with distinct keys.
//!
//! Verification is stateless: a syntactically valid token verifies as
//! many times as it is presented within the acceptance window. Callers
//! that need single-use semantics must layer a seen-nonce store on top.

use std::sync::{Mutex, MutexGuard};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;

use crate::audit::{AuditEvent, AuditLog, AuditSink, FileAuditSink, Status};
use crate::config::{Config, DEFAULT_ENCRYPTION_KEY, DEFAULT_SECRET_KEY};
use crate::crypto;
use crate::error::TokenVaultError;
use crate::expiry;
use crate::keys::SecretKey;
use crate::token::{self, TokenEnvelope};

/// Request-scoped token authentication and payload confidentiality.
///
/// All four operations are pure functions of their inputs plus the
/// immutable key material, so a vault can be shared across threads and
/// called in parallel without external locking. The only shared state is
/// the audit log, guarded internally.
pub struct TokenVault {
    token_secret: SecretKey,
    data_key: SecretKey,
    max_token_age_secs: i64,
    audit: Mutex<AuditLog>,
}

impl TokenVault {
    /// Build a vault from explicit key material, with the default token
    /// acceptance window.
    pub fn new(token_secret: SecretKey, data_key: SecretKey) -> Self {
        Self {
            token_secret,
            data_key,
            max_token_age_secs: expiry::DEFAULT_MAX_AGE_SECS,
            audit: Mutex::new(AuditLog::new()),
        }
    }

    /// Build a vault from resolved configuration.
    ///
    /// Secrets fall back to fixed non-production defaults when
    /// unconfigured (a warning is emitted per missing secret). When an
    /// audit log path is configured, a [`FileAuditSink`] is attached;
    /// failure to open it is a startup error, not a silent degradation.
    pub fn from_config(config: &Config) -> Result<Self, TokenVaultError> {
        let token_secret = SecretKey::resolve(config.secret_key.as_deref(), DEFAULT_SECRET_KEY);
        let data_key =
            SecretKey::resolve(config.encryption_key.as_deref(), DEFAULT_ENCRYPTION_KEY);

        let vault = Self::new(token_secret, data_key).with_max_token_age(config.token_max_age_secs);

        if let Some(path) = &config.audit_log_file {
            let sink = FileAuditSink::new(path)
                .map_err(|_| TokenVaultError::AuditLogUnavailable(path.display().to_string()))?;
            vault.add_audit_sink(Box::new(sink));
        }

        Ok(vault)
    }

    /// Override the token acceptance window.
    pub fn with_max_token_age(mut self, secs: i64) -> Self {
        self.max_token_age_secs = secs;
        self
    }

    /// Add a sink to receive a copy of every audit event.
    pub fn add_audit_sink(&self, sink: Box<dyn AuditSink>) {
        self.audit_log().add_forward_sink(sink);
    }

    /// Access the in-memory audit log.
    pub fn audit_log(&self) -> MutexGuard<'_, AuditLog> {
        // A sink that panicked mid-append leaves usable log state behind;
        // keep reporting rather than poisoning the whole vault.
        self.audit.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // -----------------------------------------------------------------------
    // Public operations
    // -----------------------------------------------------------------------

    /// Issue a token binding `(request_id, instance_id, data_key)`.
    ///
    /// The returned envelope is presented whole at verification time.
    pub fn generate_token(
        &self,
        request_id: &str,
        instance_id: &str,
        data_key: &str,
        user_id: &str,
    ) -> Result<TokenEnvelope, TokenVaultError> {
        self.require(user_id, "GENERATE", request_id, "request_id")?;
        self.require(user_id, "GENERATE", instance_id, "instance_id")?;
        self.require(user_id, "GENERATE", data_key, "data_key")?;
        self.require(user_id, "GENERATE", user_id, "user_id")?;

        let envelope = token::generate(
            request_id,
            instance_id,
            data_key,
            &self.token_secret,
            Utc::now().timestamp(),
        );

        self.record(AuditEvent::token_generation(
            user_id,
            &envelope.token,
            Status::Success,
        ));
        Ok(envelope)
    }

    /// Check a presented token against the original context.
    ///
    /// Returns `Ok(true)` iff the digest matches and the timestamp is
    /// inside the acceptance window. A failed verification is a normal
    /// `Ok(false)` — only absent parameters are an error.
    #[allow(clippy::too_many_arguments)]
    pub fn verify_token(
        &self,
        token: &str,
        request_id: &str,
        instance_id: &str,
        data_key: &str,
        nonce: &str,
        timestamp: i64,
        user_id: &str,
    ) -> Result<bool, TokenVaultError> {
        self.require(user_id, "VERIFY", token, "token")?;
        self.require(user_id, "VERIFY", request_id, "request_id")?;
        self.require(user_id, "VERIFY", instance_id, "instance_id")?;
        self.require(user_id, "VERIFY", data_key, "data_key")?;
        self.require(user_id, "VERIFY", nonce, "nonce")?;
        self.require(user_id, "VERIFY", user_id, "user_id")?;
        if timestamp <= 0 {
            self.record(AuditEvent::error(
                user_id,
                "VERIFY",
                "missing required parameter: timestamp",
            ));
            return Err(TokenVaultError::MissingParameter("timestamp"));
        }

        let matches = token::verify(
            token,
            request_id,
            instance_id,
            data_key,
            nonce,
            timestamp,
            &self.token_secret,
        );
        let expired = expiry::is_expired(timestamp, self.max_token_age_secs, Utc::now().timestamp());
        let valid = matches && !expired;

        let status = if valid { Status::Success } else { Status::Failure };
        self.record(AuditEvent::token_verification(user_id, token, status));
        Ok(valid)
    }

    /// Encrypt a payload value for storage.
    ///
    /// Returns a self-contained base64 blob; see [`crate::crypto`] for the
    /// layout. A fresh nonce is drawn per call, so encrypting the same
    /// value twice yields different blobs.
    pub fn encrypt_data(&self, plaintext: &str, user_id: &str) -> Result<String, TokenVaultError> {
        self.require(user_id, "ENCRYPT", plaintext, "plaintext")?;
        self.require(user_id, "ENCRYPT", user_id, "user_id")?;

        let blob = crypto::seal(self.data_key.as_bytes(), plaintext.as_bytes())?;
        self.record(AuditEvent::encryption(user_id, "data", Status::Success));
        Ok(BASE64.encode(blob))
    }

    /// Decrypt a blob produced by [`TokenVault::encrypt_data`].
    ///
    /// Any tampering, truncation, or key mismatch fails with
    /// [`TokenVaultError::DecryptionFailure`]; the failure is audited
    /// before it is surfaced.
    pub fn decrypt_data(&self, ciphertext: &str, user_id: &str) -> Result<String, TokenVaultError> {
        self.require(user_id, "DECRYPT", ciphertext, "ciphertext")?;
        self.require(user_id, "DECRYPT", user_id, "user_id")?;

        match self.open_blob(ciphertext) {
            Ok(plaintext) => {
                self.record(AuditEvent::decryption(user_id, "data", Status::Success));
                Ok(plaintext)
            }
            Err(err) => {
                tracing::warn!(target: "tokenvault", user_id, "payload decryption failed");
                self.record(AuditEvent::decryption(user_id, "data", Status::Failure));
                self.record(AuditEvent::error(
                    user_id,
                    "DECRYPT",
                    format!("decryption failed: {err}"),
                ));
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn open_blob(&self, ciphertext: &str) -> Result<String, TokenVaultError> {
        let blob = BASE64
            .decode(ciphertext)
            .map_err(|_| TokenVaultError::DecryptionFailure)?;
        let plaintext = crypto::open(self.data_key.as_bytes(), &blob)?;
        String::from_utf8(plaintext).map_err(|_| TokenVaultError::DecryptionFailure)
    }

    /// Fail fast on an absent argument, reporting the rejection before any
    /// cryptographic work happens.
    fn require(
        &self,
        user_id: &str,
        action: &str,
        value: &str,
        name: &'static str,
    ) -> Result<(), TokenVaultError> {
        if value.is_empty() {
            self.record(AuditEvent::error(
                user_id,
                action,
                format!("missing required parameter: {name}"),
            ));
            return Err(TokenVaultError::MissingParameter(name));
        }
        Ok(())
    }

    fn record(&self, event: AuditEvent) {
        self.audit_log().append(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::EventType;
    use crate::crypto::KEY_LEN;

    fn test_vault() -> TokenVault {
        TokenVault::new(
            SecretKey::from_bytes([1u8; KEY_LEN]),
            SecretKey::from_bytes([2u8; KEY_LEN]),
        )
    }

    #[test]
    fn test_generate_and_verify_round_trip() {
        let vault = test_vault();
        let envelope = vault
            .generate_token("req-1", "inst-1", "key-1", "user-1")
            .unwrap();

        let valid = vault
            .verify_token(
                &envelope.token,
                "req-1",
                "inst-1",
                "key-1",
                &envelope.nonce,
                envelope.timestamp,
                "user-1",
            )
            .unwrap();
        assert!(valid);
    }

    #[test]
    fn test_failed_verification_is_ok_false() {
        let vault = test_vault();
        let envelope = vault
            .generate_token("req-1", "inst-1", "key-1", "user-1")
            .unwrap();

        // Wrong request id: well-formed input, so no error is raised.
        let valid = vault
            .verify_token(
                &envelope.token,
                "req-other",
                "inst-1",
                "key-1",
                &envelope.nonce,
                envelope.timestamp,
                "user-1",
            )
            .unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let vault = test_vault().with_max_token_age(0);
        let envelope = token::generate(
            "req-1",
            "inst-1",
            "key-1",
            &SecretKey::from_bytes([1u8; KEY_LEN]),
            Utc::now().timestamp() - 10,
        );

        let valid = vault
            .verify_token(
                &envelope.token,
                "req-1",
                "inst-1",
                "key-1",
                &envelope.nonce,
                envelope.timestamp,
                "user-1",
            )
            .unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_missing_parameter_reports_error_event() {
        let vault = test_vault();
        let result = vault.generate_token("", "inst-1", "key-1", "user-1");
        assert!(matches!(
            result,
            Err(TokenVaultError::MissingParameter("request_id"))
        ));

        let log = vault.audit_log();
        assert_eq!(log.len(), 1);
        let event = log.iter().next().unwrap();
        assert_eq!(event.event_type, EventType::Error);
        assert_eq!(event.status, Status::Failure);
    }

    #[test]
    fn test_zero_timestamp_is_missing() {
        let vault = test_vault();
        let result = vault.verify_token("ab", "r", "i", "d", "n", 0, "u");
        assert!(matches!(
            result,
            Err(TokenVaultError::MissingParameter("timestamp"))
        ));
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let vault = test_vault();
        let blob = vault.encrypt_data("secret-value", "user-1").unwrap();
        assert_ne!(blob, "secret-value");
        let plaintext = vault.decrypt_data(&blob, "user-1").unwrap();
        assert_eq!(plaintext, "secret-value");
    }

    #[test]
    fn test_decrypt_garbage_fails_and_audits() {
        let vault = test_vault();
        let result = vault.decrypt_data("definitely-not-a-blob", "user-1");
        assert!(matches!(result, Err(TokenVaultError::DecryptionFailure)));

        // FAILURE event plus a separate error-detail event.
        let log = vault.audit_log();
        assert_eq!(log.len(), 2);
        let mut events = log.iter();
        let failure = events.next().unwrap();
        assert_eq!(failure.event_type, EventType::Decryption);
        assert_eq!(failure.status, Status::Failure);
        let detail = events.next().unwrap();
        assert_eq!(detail.event_type, EventType::Error);
    }

    #[test]
    fn test_vaults_with_different_keys_are_isolated() {
        let vault_a = test_vault();
        let vault_b = TokenVault::new(
            SecretKey::from_bytes([9u8; KEY_LEN]),
            SecretKey::from_bytes([10u8; KEY_LEN]),
        );

        let blob = vault_a.encrypt_data("cross-vault", "user-1").unwrap();
        assert!(vault_b.decrypt_data(&blob, "user-1").is_err());

        let envelope = vault_a
            .generate_token("req-1", "inst-1", "key-1", "user-1")
            .unwrap();
        let valid = vault_b
            .verify_token(
                &envelope.token,
                "req-1",
                "inst-1",
                "key-1",
                &envelope.nonce,
                envelope.timestamp,
                "user-1",
            )
            .unwrap();
        assert!(!valid);
    }
}
