// crates/zone-access-rules/src/client.rs
// ============================================================================
// Module: Zone Access Rules Client
// Description: Blocking HTTP client bound to a single zone.
// Purpose: Issue access-rule requests and decode the response envelope.
// Dependencies: reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! [`ZoneAccessRulesClient`] binds an endpoint, an owning account reference
//! (CRN) and a zone identifier, and implements [`ZoneAccessRulesApi`] over a
//! blocking `reqwest` client. Each call is sequential and blocks until the
//! response body has been read.
//! Invariants:
//! - Redirects are not followed.
//! - Response bodies are capped at [`ClientConfig::max_response_bytes`].
//! - `404` on an id-addressed call maps to [`AccessRulesError::NotFound`].
//!
//! Security posture: responses are untrusted; bearer tokens are never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::audit::NoopAuditSink;
use crate::audit::RequestAuditEvent;
use crate::audit::RequestAuditEventParams;
use crate::audit::RequestAuditSink;
use crate::audit::RequestOutcome;
use crate::envelope::ApiEnvelope;
use crate::envelope::ApiMessage;
use crate::envelope::DeletedAccessRule;
use crate::envelope::DetailedResponse;
use crate::error::AccessRulesError;
use crate::model::AccessRule;
use crate::model::AccessRuleId;
use crate::model::CreateAccessRuleRequest;
use crate::model::ListAccessRulesQuery;
use crate::model::UpdateAccessRuleRequest;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default service endpoint.
pub const DEFAULT_SERVICE_URL: &str = "https://api.cis.cloud.ibm.com";
/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default maximum response body size in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// JSON media type used for request and response bodies.
const JSON_MEDIA_TYPE: &str = "application/json";
/// Maximum number of body bytes quoted in a failure message.
const MAX_ERROR_SNIPPET_BYTES: usize = 256;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Client binding and limits.
///
/// # Invariants
/// - `endpoint` is an absolute `http://` or `https://` URL without credentials.
/// - `crn` and `zone_identifier` are non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service endpoint URL.
    pub endpoint: String,
    /// Owning account reference.
    pub crn: String,
    /// Zone the client is bound to.
    pub zone_identifier: String,
    /// Optional bearer token sent with every request.
    pub auth_token: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
    /// User agent for outbound requests.
    pub user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration with default limits and no token.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        crn: impl Into<String>,
        zone_identifier: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            crn: crn.into(),
            zone_identifier: zone_identifier.into(),
            auth_token: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: format!("zone-access-rules/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Validates the binding and limits.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRulesError::InvalidRequest`] when a field is invalid.
    pub fn validate(&self) -> Result<(), AccessRulesError> {
        parse_endpoint(&self.endpoint)?;
        if self.crn.trim().is_empty() {
            return Err(AccessRulesError::InvalidRequest("crn must be set".to_string()));
        }
        if self.zone_identifier.trim().is_empty() {
            return Err(AccessRulesError::InvalidRequest("zone identifier must be set".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(AccessRulesError::InvalidRequest(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_response_bytes == 0 {
            return Err(AccessRulesError::InvalidRequest(
                "max response bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("crn", &self.crn)
            .field("zone_identifier", &self.zone_identifier)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("max_response_bytes", &self.max_response_bytes)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

// ============================================================================
// SECTION: API Trait
// ============================================================================

/// Access-rule operations for a single zone.
pub trait ZoneAccessRulesApi {
    /// Lists rules in the zone matching the query.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRulesError`] when the query is invalid or the call fails.
    fn list_all_zone_access_rules(
        &self,
        query: &ListAccessRulesQuery,
    ) -> Result<DetailedResponse<Vec<AccessRule>>, AccessRulesError>;

    /// Creates a rule in the zone.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRulesError`] when the request is invalid or the call fails.
    fn create_zone_access_rule(
        &self,
        request: &CreateAccessRuleRequest,
    ) -> Result<DetailedResponse<AccessRule>, AccessRulesError>;

    /// Fetches a rule by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRulesError::NotFound`] when the rule does not exist.
    fn get_zone_access_rule(
        &self,
        id: &AccessRuleId,
    ) -> Result<DetailedResponse<AccessRule>, AccessRulesError>;

    /// Updates the mode and/or notes of a rule.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRulesError::NotFound`] when the rule does not exist.
    fn update_zone_access_rule(
        &self,
        id: &AccessRuleId,
        request: &UpdateAccessRuleRequest,
    ) -> Result<DetailedResponse<AccessRule>, AccessRulesError>;

    /// Deletes a rule by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRulesError::NotFound`] when the rule does not exist.
    fn delete_zone_access_rule(
        &self,
        id: &AccessRuleId,
    ) -> Result<DetailedResponse<DeletedAccessRule>, AccessRulesError>;
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking access-rules client bound to one zone.
///
/// # Invariants
/// - `config` passed [`ClientConfig::validate`] at construction.
pub struct ZoneAccessRulesClient {
    /// Binding and limits.
    config: ClientConfig,
    /// Parsed service endpoint.
    endpoint: Url,
    /// HTTP client used for outbound requests.
    client: Client,
    /// Sink receiving one event per call.
    audit: Arc<dyn RequestAuditSink>,
}

impl ZoneAccessRulesClient {
    /// Builds a client bound to the configured zone.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRulesError`] when the configuration is invalid or the
    /// HTTP client cannot be created.
    pub fn new_instance(config: ClientConfig) -> Result<Self, AccessRulesError> {
        config.validate()?;
        let endpoint = parse_endpoint(&config.endpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| AccessRulesError::Transport("http client build failed".to_string()))?;
        Ok(Self {
            config,
            endpoint,
            client,
            audit: Arc::new(NoopAuditSink),
        })
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn RequestAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Points the client at a different service endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRulesError::InvalidRequest`] when the URL is invalid.
    pub fn set_service_url(&mut self, url: &str) -> Result<(), AccessRulesError> {
        self.endpoint = parse_endpoint(url)?;
        self.config.endpoint = url.to_string();
        Ok(())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the collection URL, or the rule URL when `id` is set.
    fn rules_url(&self, id: Option<&AccessRuleId>) -> Result<Url, AccessRulesError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                AccessRulesError::InvalidRequest("endpoint cannot be a base url".to_string())
            })?;
            segments.pop_if_empty();
            segments.extend([
                "v1",
                self.config.crn.as_str(),
                "zones",
                self.config.zone_identifier.as_str(),
                "firewall",
                "access_rules",
                "rules",
            ]);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    /// Sends a request, records an audit event, and decodes the envelope.
    fn execute<T: DeserializeOwned>(
        &self,
        call: ApiCall<'_>,
    ) -> Result<DetailedResponse<T>, AccessRulesError> {
        let started = Instant::now();
        let mut url = self.rules_url(call.rule_id)?;
        if !call.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &call.query {
                pairs.append_pair(key, value);
            }
        }
        let path = url.path().to_string();
        let outcome = self.send(&call, url);
        let (status, response_bytes) = match &outcome {
            Ok(raw) => (Some(raw.status), raw.body.len()),
            Err(err) => (err.status(), 0),
        };
        let result = outcome.and_then(|raw| decode_response(&call, raw));
        self.audit.record(&RequestAuditEvent::new(RequestAuditEventParams {
            operation: call.operation,
            method: call.verb.as_str(),
            path,
            status,
            outcome: if result.is_ok() { RequestOutcome::Ok } else { RequestOutcome::Error },
            error_kind: result.as_ref().err().map(AccessRulesError::kind),
            response_bytes,
            duration_ms: started.elapsed().as_millis(),
        }));
        result
    }

    /// Performs the HTTP exchange and reads the bounded body.
    fn send(&self, call: &ApiCall<'_>, url: Url) -> Result<RawResponse, AccessRulesError> {
        let mut request =
            self.client.request(call.verb.as_method(), url).header(ACCEPT, JSON_MEDIA_TYPE);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &call.body {
            request = request.header(CONTENT_TYPE, JSON_MEDIA_TYPE).body(body.clone());
        }
        let mut response = request.send().map_err(|err| {
            if err.is_timeout() {
                AccessRulesError::Transport("request timed out".to_string())
            } else {
                AccessRulesError::Transport("http request failed".to_string())
            }
        })?;
        let status = response.status().as_u16();
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        Ok(RawResponse {
            status,
            body,
        })
    }
}

impl ZoneAccessRulesApi for ZoneAccessRulesClient {
    fn list_all_zone_access_rules(
        &self,
        query: &ListAccessRulesQuery,
    ) -> Result<DetailedResponse<Vec<AccessRule>>, AccessRulesError> {
        query.validate()?;
        self.execute(ApiCall {
            operation: "list_all_zone_access_rules",
            verb: Verb::Get,
            rule_id: None,
            query: query.query_pairs(),
            body: None,
        })
    }

    fn create_zone_access_rule(
        &self,
        request: &CreateAccessRuleRequest,
    ) -> Result<DetailedResponse<AccessRule>, AccessRulesError> {
        request.validate()?;
        self.execute(ApiCall {
            operation: "create_zone_access_rule",
            verb: Verb::Post,
            rule_id: None,
            query: Vec::new(),
            body: Some(encode_body(request)?),
        })
    }

    fn get_zone_access_rule(
        &self,
        id: &AccessRuleId,
    ) -> Result<DetailedResponse<AccessRule>, AccessRulesError> {
        ensure_id(id)?;
        self.execute(ApiCall {
            operation: "get_zone_access_rule",
            verb: Verb::Get,
            rule_id: Some(id),
            query: Vec::new(),
            body: None,
        })
    }

    fn update_zone_access_rule(
        &self,
        id: &AccessRuleId,
        request: &UpdateAccessRuleRequest,
    ) -> Result<DetailedResponse<AccessRule>, AccessRulesError> {
        ensure_id(id)?;
        request.validate()?;
        self.execute(ApiCall {
            operation: "update_zone_access_rule",
            verb: Verb::Patch,
            rule_id: Some(id),
            query: Vec::new(),
            body: Some(encode_body(request)?),
        })
    }

    fn delete_zone_access_rule(
        &self,
        id: &AccessRuleId,
    ) -> Result<DetailedResponse<DeletedAccessRule>, AccessRulesError> {
        ensure_id(id)?;
        self.execute(ApiCall {
            operation: "delete_zone_access_rule",
            verb: Verb::Delete,
            rule_id: Some(id),
            query: Vec::new(),
            body: None,
        })
    }
}

// ============================================================================
// SECTION: Request Plumbing
// ============================================================================

/// HTTP verbs used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PATCH.
    Patch,
    /// DELETE.
    Delete,
}

impl Verb {
    /// Returns the method label used in audit events.
    const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Returns the `reqwest` method.
    fn as_method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Patch => Method::PATCH,
            Self::Delete => Method::DELETE,
        }
    }
}

/// One API call before it is sent.
struct ApiCall<'a> {
    /// Operation name for audit events.
    operation: &'static str,
    /// HTTP verb.
    verb: Verb,
    /// Rule addressed by the call, if any.
    rule_id: Option<&'a AccessRuleId>,
    /// Query-string pairs.
    query: Vec<(&'static str, String)>,
    /// Serialized JSON body.
    body: Option<Vec<u8>>,
}

/// Status and body of a received response.
struct RawResponse {
    /// HTTP status code.
    status: u16,
    /// Bounded response body.
    body: Vec<u8>,
}

/// Error-only view of the envelope used for failed responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    /// Errors reported by the service.
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses and checks a service endpoint URL.
fn parse_endpoint(raw: &str) -> Result<Url, AccessRulesError> {
    let url = Url::parse(raw.trim())
        .map_err(|_| AccessRulesError::InvalidRequest("invalid endpoint url".to_string()))?;
    match url.scheme() {
        "https" | "http" => {}
        _ => return Err(AccessRulesError::InvalidRequest("unsupported url scheme".to_string())),
    }
    if url.host_str().is_none() {
        return Err(AccessRulesError::InvalidRequest("endpoint host required".to_string()));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(AccessRulesError::InvalidRequest(
            "endpoint credentials are not allowed".to_string(),
        ));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(AccessRulesError::InvalidRequest(
            "endpoint must not carry a query or fragment".to_string(),
        ));
    }
    Ok(url)
}

/// Rejects blank identifiers before they become a collection route.
fn ensure_id(id: &AccessRuleId) -> Result<(), AccessRulesError> {
    if id.is_blank() {
        return Err(AccessRulesError::InvalidRequest("rule identifier must be set".to_string()));
    }
    Ok(())
}

/// Serializes a request body.
fn encode_body<T: Serialize>(body: &T) -> Result<Vec<u8>, AccessRulesError> {
    serde_json::to_vec(body)
        .map_err(|err| AccessRulesError::InvalidRequest(format!("body serialization: {err}")))
}

/// Maps a raw response to a decoded envelope or a classified error.
fn decode_response<T: DeserializeOwned>(
    call: &ApiCall<'_>,
    raw: RawResponse,
) -> Result<DetailedResponse<T>, AccessRulesError> {
    if (200..300).contains(&raw.status) {
        let result: ApiEnvelope<T> = serde_json::from_slice(&raw.body)
            .map_err(|err| AccessRulesError::Decode(err.to_string()))?;
        return Ok(DetailedResponse {
            status_code: raw.status,
            result,
        });
    }
    if raw.status == 404
        && let Some(id) = call.rule_id
    {
        return Err(AccessRulesError::NotFound {
            id: id.clone(),
        });
    }
    Err(AccessRulesError::RequestFailed {
        status: raw.status,
        message: failure_message(&raw.body),
    })
}

/// Extracts the first service error message, falling back to a body snippet.
fn failure_message(body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body)
        && let Some(first) = envelope.errors.into_iter().next()
    {
        return first.message;
    }
    let end = body.len().min(MAX_ERROR_SNIPPET_BYTES);
    String::from_utf8_lossy(&body[..end]).trim().to_string()
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, AccessRulesError> {
    let max_bytes_u64 = u64::try_from(max_bytes).map_err(|_| {
        AccessRulesError::InvalidRequest("response size limit exceeds u64".to_string())
    })?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(AccessRulesError::ResponseTooLarge {
            actual: expected,
            limit: max_bytes_u64,
        });
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle
        .read_to_end(&mut buf)
        .map_err(|_| AccessRulesError::Transport("failed to read response".to_string()))?;
    if buf.len() > max_bytes {
        return Err(AccessRulesError::ResponseTooLarge {
            actual: u64::try_from(buf.len()).unwrap_or(u64::MAX),
            limit: max_bytes_u64,
        });
    }
    Ok(buf)
}
