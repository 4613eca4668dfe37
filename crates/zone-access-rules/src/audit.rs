// crates/zone-access-rules/src/audit.rs
// ============================================================================
// Module: Request Audit Logging
// Description: Structured audit events for access-rule API calls.
// Purpose: Emit one JSON line per request without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every client call produces a [`RequestAuditEvent`] that is handed to the
//! configured [`RequestAuditSink`]. Events carry the route, status and timing
//! of the call but never request bodies or credentials, so they can be routed
//! to any log pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// The call returned a decoded success response.
    Ok,
    /// The call failed locally or remotely.
    Error,
}

/// Audit event payload for a single API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Client operation name.
    pub operation: &'static str,
    /// HTTP method.
    pub method: &'static str,
    /// Request path, without query string.
    pub path: String,
    /// HTTP status when a response was received.
    pub status: Option<u16>,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// Error kind label when the call failed.
    pub error_kind: Option<&'static str>,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Wall-clock duration of the call in milliseconds.
    pub duration_ms: u128,
}

/// Inputs required to construct a request audit event.
pub struct RequestAuditEventParams {
    /// Client operation name.
    pub operation: &'static str,
    /// HTTP method.
    pub method: &'static str,
    /// Request path, without query string.
    pub path: String,
    /// HTTP status when a response was received.
    pub status: Option<u16>,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// Error kind label when the call failed.
    pub error_kind: Option<&'static str>,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Wall-clock duration of the call in milliseconds.
    pub duration_ms: u128,
}

impl RequestAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: RequestAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "access_rules_request",
            timestamp_ms,
            operation: params.operation,
            method: params.method,
            path: params.path,
            status: params.status,
            outcome: params.outcome,
            error_kind: params.error_kind,
            response_bytes: params.response_bytes,
            duration_ms: params.duration_ms,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for access-rule requests.
pub trait RequestAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &RequestAuditEvent);
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl RequestAuditSink for StderrAuditSink {
    fn record(&self, event: &RequestAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RequestAuditSink for FileAuditSink {
    fn record(&self, event: &RequestAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl RequestAuditSink for NoopAuditSink {
    fn record(&self, _event: &RequestAuditEvent) {}
}
