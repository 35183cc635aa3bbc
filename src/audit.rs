//! Structured audit reporting.
//!
//! Every public vault operation reports its outcome as an [`AuditEvent`].
//! The log is append-only and supports pluggable sinks for forwarding
//! events to files or other stores. Events never carry secret material —
//! resources are identified by digest or data key, not by content.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The category of an audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    TokenGeneration,
    TokenVerification,
    DataAccess,
    Encryption,
    Decryption,
    Error,
}

/// The outcome of an audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Failure,
}

/// A record of one operation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// When the operation completed.
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    /// The caller the operation was performed for.
    pub user_id: String,
    /// The operation performed, e.g. `GENERATE` or `DECRYPT`.
    pub action: String,
    /// What the operation acted on: a token digest or a data identifier.
    pub resource: String,
    pub status: Status,
    /// Extra diagnostic detail, present on error events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AuditEvent {
    fn new(
        event_type: EventType,
        user_id: &str,
        action: &str,
        resource: &str,
        status: Status,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            user_id: user_id.to_string(),
            action: action.to_string(),
            resource: resource.to_string(),
            status,
            details: None,
        }
    }

    pub fn token_generation(user_id: &str, token_id: &str, status: Status) -> Self {
        Self::new(EventType::TokenGeneration, user_id, "GENERATE", token_id, status)
    }

    pub fn token_verification(user_id: &str, token_id: &str, status: Status) -> Self {
        Self::new(EventType::TokenVerification, user_id, "VERIFY", token_id, status)
    }

    pub fn data_access(user_id: &str, data_key: &str, action: &str, status: Status) -> Self {
        Self::new(EventType::DataAccess, user_id, action, data_key, status)
    }

    pub fn encryption(user_id: &str, data_key: &str, status: Status) -> Self {
        Self::new(EventType::Encryption, user_id, "ENCRYPT", data_key, status)
    }

    pub fn decryption(user_id: &str, data_key: &str, status: Status) -> Self {
        Self::new(EventType::Decryption, user_id, "DECRYPT", data_key, status)
    }

    /// An error event. `details` must not contain secret material.
    pub fn error(user_id: &str, action: &str, details: impl Into<String>) -> Self {
        let mut event = Self::new(EventType::Error, user_id, action, "", Status::Failure);
        event.details = Some(details.into());
        event
    }
}

/// A sink that receives audit events. Implement this to forward events to
/// a file, database, or other persistent store. Sinks are invoked inline
/// on the operation path and must be fast or internally buffered.
pub trait AuditSink: Send {
    /// Append an event. Called once per operation outcome.
    fn append(&mut self, event: AuditEvent);
}

/// An append-only log of all operation outcomes.
/// Can forward events to additional sinks via `add_forward_sink`.
#[derive(Default, Serialize, Deserialize)]
pub struct AuditLog {
    events: Vec<AuditEvent>,
    #[serde(skip)]
    forward_sinks: Option<Vec<Box<dyn AuditSink>>>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("events", &self.events)
            .field(
                "forward_sinks",
                &self.forward_sinks.as_ref().map(|s| s.len()),
            )
            .finish()
    }
}

impl Clone for AuditLog {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            forward_sinks: None, // Forward sinks are not cloned
        }
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            forward_sinks: None,
        }
    }

    /// Add a sink to receive a copy of every event. Useful for persisting
    /// to a file or other store without replacing the in-memory log.
    pub fn add_forward_sink(&mut self, sink: Box<dyn AuditSink>) {
        self.forward_sinks.get_or_insert_with(Vec::new).push(sink);
    }

    /// Append a new event to the log and forward to any attached sinks.
    pub fn append(&mut self, event: AuditEvent) {
        if let Some(ref mut sinks) = self.forward_sinks {
            for sink in sinks.iter_mut() {
                sink.append(event.clone());
            }
        }
        self.events.push(event);
    }

    /// Return the number of events in the log.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over the events.
    pub fn iter(&self) -> std::slice::Iter<'_, AuditEvent> {
        self.events.iter()
    }
}

// ---------------------------------------------------------------------------
// Built-in sink: file
// ---------------------------------------------------------------------------

/// Writes audit events as JSON lines (one per event) to a file.
/// Creates the file if it doesn't exist; appends if it does.
pub struct FileAuditSink {
    file: std::fs::File,
}

impl FileAuditSink {
    /// Open or create a file for append-only audit logging.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl AuditSink for FileAuditSink {
    fn append(&mut self, event: AuditEvent) {
        if let Ok(line) = serde_json::to_string(&event) {
            let _ = writeln!(self.file, "{line}");
            let _ = self.file.flush();
        }
    }
}
