// crates/zone-access-rules/src/error.rs
// ============================================================================
// Module: Access Rules Errors
// Description: Error taxonomy for access-rule client calls.
// Purpose: Classify failures into stable, caller-visible variants.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every client call fails with one [`AccessRulesError`] variant. Remote
//! failures carry the HTTP status and the first message reported by the
//! service; local failures (validation, decoding, limits) never reach the
//! network or are raised after the response has been received.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::model::AccessRuleId;

// ============================================================================
// SECTION: Error Types
// ============================================================================

/// Access-rule client errors.
///
/// # Invariants
/// - Variants are stable for harness error mapping and tests.
/// - `message` payloads may include untrusted server text.
#[derive(Debug, Error)]
pub enum AccessRulesError {
    /// The remote call returned a non-success status.
    #[error("request failed with status {status}: {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// First error message reported by the service.
        message: String,
    },
    /// The referenced rule does not exist.
    #[error("access rule not found: {id}")]
    NotFound {
        /// Identifier that was requested.
        id: AccessRuleId,
    },
    /// Request input failed local validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Client construction or transport failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// Response body exceeds the configured limit.
    #[error("response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Observed size in bytes.
        actual: u64,
        /// Maximum size in bytes.
        limit: u64,
    },
}

impl AccessRulesError {
    /// Returns a stable label for audit events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RequestFailed {
                ..
            } => "request_failed",
            Self::NotFound {
                ..
            } => "not_found",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
            Self::ResponseTooLarge {
                ..
            } => "response_too_large",
        }
    }

    /// Returns the HTTP status when the error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed {
                status, ..
            } => Some(*status),
            Self::NotFound {
                ..
            } => Some(404),
            _ => None,
        }
    }
}
