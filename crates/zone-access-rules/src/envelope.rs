// crates/zone-access-rules/src/envelope.rs
// ============================================================================
// Module: Response Envelope
// Description: Shared response wrapper for access-rule API calls.
// Purpose: Expose status codes and decoded payloads to callers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The service wraps every payload in `{success, errors, messages, result,
//! result_info}`. [`DetailedResponse`] pairs that envelope with the HTTP status
//! so callers can check both independently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::model::AccessRuleId;

// ============================================================================
// SECTION: Envelope Types
// ============================================================================

/// Error or informational message reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Service message code.
    #[serde(default)]
    pub code: i64,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Paging metadata for list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    /// Current page.
    pub page: u32,
    /// Rules per page.
    pub per_page: u32,
    /// Rules on this page.
    pub count: u32,
    /// Rules across all pages.
    pub total_count: u32,
}

/// Response envelope returned by every API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the service reports success.
    pub success: bool,
    /// Errors reported by the service.
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    /// Informational messages.
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
    /// Operation payload.
    pub result: T,
    /// Paging metadata for list calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_info: Option<ResultInfo>,
}

impl<T> ApiEnvelope<T> {
    /// Wraps a payload in a successful envelope.
    #[must_use]
    pub const fn success(result: T) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            messages: Vec::new(),
            result,
            result_info: None,
        }
    }
}

/// Payload returned when a rule is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedAccessRule {
    /// Identifier of the deleted rule.
    pub id: AccessRuleId,
}

/// HTTP status paired with the decoded envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailedResponse<T> {
    /// HTTP status code.
    pub status_code: u16,
    /// Decoded response envelope.
    pub result: ApiEnvelope<T>,
}

impl<T> DetailedResponse<T> {
    /// Returns the operation payload.
    #[must_use]
    pub const fn payload(&self) -> &T {
        &self.result.result
    }

    /// Consumes the response and returns the operation payload.
    #[must_use]
    pub fn into_payload(self) -> T {
        self.result.result
    }
}
