// crates/zone-access-rules/src/lib.rs
// ============================================================================
// Module: Zone Access Rules Client
// Description: Typed client for zone firewall access-rule management.
// Purpose: Provide request construction and response decoding for the rules API.
// Dependencies: reqwest, serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! This crate binds a blocking HTTP client to a single zone and exposes the
//! five access-rule operations (create, get, update, delete, list) through the
//! [`ZoneAccessRulesApi`] trait. Transport, TLS and connection handling are
//! delegated to `reqwest`; this crate only builds routes, serializes request
//! bodies and decodes the response envelope.
//! Invariants:
//! - Rule configurations are validated before any request is sent.
//! - Response bodies are read under a hard size limit.
//! - Bearer tokens never appear in audit events or `Debug` output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod client;
pub mod envelope;
pub mod error;
pub mod model;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RequestAuditEvent;
pub use audit::RequestAuditSink;
pub use audit::StderrAuditSink;
pub use client::ClientConfig;
pub use client::ZoneAccessRulesApi;
pub use client::ZoneAccessRulesClient;
pub use envelope::ApiEnvelope;
pub use envelope::ApiMessage;
pub use envelope::DeletedAccessRule;
pub use envelope::DetailedResponse;
pub use envelope::ResultInfo;
pub use error::AccessRulesError;
pub use model::AccessRule;
pub use model::AccessRuleId;
pub use model::AccessRuleMode;
pub use model::AccessRuleScope;
pub use model::ConfigurationTarget;
pub use model::CreateAccessRuleRequest;
pub use model::ListAccessRulesQuery;
pub use model::ListDirection;
pub use model::ListMatch;
pub use model::ListOrder;
pub use model::RuleConfiguration;
pub use model::UpdateAccessRuleRequest;
