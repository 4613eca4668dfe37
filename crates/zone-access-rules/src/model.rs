// crates/zone-access-rules/src/model.rs
// ============================================================================
// Module: Access Rule Model
// Description: Access-rule resource, request payloads and list queries.
// Purpose: Provide typed, validated inputs for the access-rules API.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Access rules bind a [`RuleConfiguration`] (IP address, CIDR range or ASN) to
//! an [`AccessRuleMode`]. Identifiers are assigned by the server and treated as
//! opaque strings. Request payloads validate configuration syntax locally so
//! malformed rules fail before reaching the network.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::AccessRulesError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted length of rule notes, in bytes.
pub const MAX_NOTES_BYTES: usize = 1024;
/// Smallest page size accepted by the list operation.
pub const MIN_PER_PAGE: u32 = 5;
/// Largest page size accepted by the list operation.
pub const MAX_PER_PAGE: u32 = 500;
/// Maximum number of digits in an ASN value.
const MAX_ASN_DIGITS: usize = 10;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Server-assigned access rule identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessRuleId(String);

impl AccessRuleId {
    /// Creates a new access rule identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the identifier is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for AccessRuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AccessRuleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccessRuleId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Enumerations
// ============================================================================

/// Action applied to traffic matching an access rule.
///
/// # Invariants
/// - Serialized names are stable wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRuleMode {
    /// Block matching traffic.
    Block,
    /// Present an interactive challenge.
    Challenge,
    /// Allow matching traffic.
    Whitelist,
    /// Present a JavaScript challenge.
    JsChallenge,
}

impl AccessRuleMode {
    /// All modes in a fixed order.
    pub const ALL: [Self; 4] = [Self::Block, Self::Challenge, Self::Whitelist, Self::JsChallenge];

    /// Returns the wire name for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Challenge => "challenge",
            Self::Whitelist => "whitelist",
            Self::JsChallenge => "js_challenge",
        }
    }
}

impl fmt::Display for AccessRuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessRuleMode {
    type Err = AccessRulesError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| AccessRulesError::InvalidRequest(format!("unknown mode: {value}")))
    }
}

/// Kind of traffic source an access rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationTarget {
    /// Single IP address.
    Ip,
    /// CIDR address range.
    IpRange,
    /// Autonomous system number.
    Asn,
}

impl ConfigurationTarget {
    /// All targets in a fixed order.
    pub const ALL: [Self; 3] = [Self::Ip, Self::IpRange, Self::Asn];

    /// Returns the wire name for the target.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::IpRange => "ip_range",
            Self::Asn => "asn",
        }
    }
}

impl fmt::Display for ConfigurationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigurationTarget {
    type Err = AccessRulesError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str() == value)
            .ok_or_else(|| AccessRulesError::InvalidRequest(format!("unknown target: {value}")))
    }
}

// ============================================================================
// SECTION: Rule Configuration
// ============================================================================

/// Target/value pair matched by an access rule.
///
/// # Invariants
/// - `value` syntax depends on `target`; see [`RuleConfiguration::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleConfiguration {
    /// Kind of value being matched.
    pub target: ConfigurationTarget,
    /// Address, range or ASN string.
    pub value: String,
}

impl RuleConfiguration {
    /// Creates a configuration from a target and value.
    #[must_use]
    pub fn new(target: ConfigurationTarget, value: impl Into<String>) -> Self {
        Self {
            target,
            value: value.into(),
        }
    }

    /// Creates a single-address configuration.
    #[must_use]
    pub fn ip(value: impl Into<String>) -> Self {
        Self::new(ConfigurationTarget::Ip, value)
    }

    /// Creates a CIDR range configuration.
    #[must_use]
    pub fn ip_range(value: impl Into<String>) -> Self {
        Self::new(ConfigurationTarget::IpRange, value)
    }

    /// Creates an autonomous system number configuration.
    #[must_use]
    pub fn asn(value: impl Into<String>) -> Self {
        Self::new(ConfigurationTarget::Asn, value)
    }

    /// Validates the value against the syntax expected for the target.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRulesError::InvalidRequest`] when the value is malformed.
    pub fn validate(&self) -> Result<(), AccessRulesError> {
        let valid = match self.target {
            ConfigurationTarget::Ip => self.value.parse::<IpAddr>().is_ok(),
            ConfigurationTarget::IpRange => is_valid_cidr(&self.value),
            ConfigurationTarget::Asn => is_valid_asn(&self.value),
        };
        if valid {
            Ok(())
        } else {
            Err(AccessRulesError::InvalidRequest(format!(
                "invalid {} value: {}",
                self.target, self.value
            )))
        }
    }
}

impl fmt::Display for RuleConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.target, self.value)
    }
}

/// Returns true for `<address>/<prefix>` with a prefix within the family width.
fn is_valid_cidr(value: &str) -> bool {
    let Some((addr, prefix)) = value.split_once('/') else {
        return false;
    };
    let Ok(addr) = addr.parse::<IpAddr>() else {
        return false;
    };
    if prefix.is_empty() || !prefix.bytes().all(|byte| byte.is_ascii_digit()) {
        return false;
    }
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    match addr {
        IpAddr::V4(_) => prefix <= 32,
        IpAddr::V6(_) => prefix <= 128,
    }
}

/// Returns true for `AS<digits>` where the number fits in 32 bits.
fn is_valid_asn(value: &str) -> bool {
    let Some(prefix) = value.get(..2) else {
        return false;
    };
    if !prefix.eq_ignore_ascii_case("as") {
        return false;
    }
    let digits = &value[2..];
    if digits.is_empty()
        || digits.len() > MAX_ASN_DIGITS
        || !digits.bytes().all(|byte| byte.is_ascii_digit())
    {
        return false;
    }
    digits.parse::<u32>().is_ok()
}

/// Validates optional notes against the length limit.
fn validate_notes(notes: Option<&str>) -> Result<(), AccessRulesError> {
    match notes {
        Some(notes) if notes.len() > MAX_NOTES_BYTES => Err(AccessRulesError::InvalidRequest(
            format!("notes exceed {MAX_NOTES_BYTES} bytes"),
        )),
        _ => Ok(()),
    }
}

// ============================================================================
// SECTION: Resource
// ============================================================================

/// Scope that owns an access rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRuleScope {
    /// Scope label, for example `zone`.
    #[serde(rename = "type")]
    pub scope_type: String,
}

/// Access rule as returned by the service.
///
/// # Invariants
/// - `id` is assigned by the server and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    /// Rule identifier.
    pub id: AccessRuleId,
    /// Free-text annotation.
    #[serde(default)]
    pub notes: String,
    /// Modes the service allows for this rule.
    #[serde(default)]
    pub allowed_modes: Vec<AccessRuleMode>,
    /// Current action.
    pub mode: AccessRuleMode,
    /// Owning scope when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<AccessRuleScope>,
    /// Creation timestamp when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    /// Last modification timestamp when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<String>,
    /// Matched traffic source.
    pub configuration: RuleConfiguration,
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Body of a create-rule request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccessRuleRequest {
    /// Action for the new rule.
    pub mode: AccessRuleMode,
    /// Optional annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Matched traffic source.
    pub configuration: RuleConfiguration,
}

impl CreateAccessRuleRequest {
    /// Creates a request for the given mode and configuration.
    #[must_use]
    pub const fn new(mode: AccessRuleMode, configuration: RuleConfiguration) -> Self {
        Self {
            mode,
            notes: None,
            configuration,
        }
    }

    /// Attaches notes to the request.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Validates configuration syntax and notes length.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRulesError::InvalidRequest`] when validation fails.
    pub fn validate(&self) -> Result<(), AccessRulesError> {
        self.configuration.validate()?;
        validate_notes(self.notes.as_deref())
    }
}

/// Body of an update-rule request.
///
/// # Invariants
/// - At least one of `mode` or `notes` is set for a valid request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateAccessRuleRequest {
    /// New action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<AccessRuleMode>,
    /// New annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl UpdateAccessRuleRequest {
    /// Creates an update that changes the mode and notes.
    #[must_use]
    pub fn new(mode: AccessRuleMode, notes: impl Into<String>) -> Self {
        Self {
            mode: Some(mode),
            notes: Some(notes.into()),
        }
    }

    /// Validates that the update changes something and notes fit the limit.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRulesError::InvalidRequest`] when validation fails.
    pub fn validate(&self) -> Result<(), AccessRulesError> {
        if self.mode.is_none() && self.notes.is_none() {
            return Err(AccessRulesError::InvalidRequest(
                "update must set mode or notes".to_string(),
            ));
        }
        validate_notes(self.notes.as_deref())
    }
}

// ============================================================================
// SECTION: List Query
// ============================================================================

/// Field used to order list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// Order by configuration target.
    ConfigurationTarget,
    /// Order by configuration value.
    ConfigurationValue,
    /// Order by mode.
    Mode,
}

impl ListOrder {
    /// Returns the query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigurationTarget => "configuration.target",
            Self::ConfigurationValue => "configuration.value",
            Self::Mode => "mode",
        }
    }
}

/// Sort direction for list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl ListDirection {
    /// Returns the query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// How multiple list filters combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMatch {
    /// Any filter may match.
    Any,
    /// Every filter must match.
    All,
}

impl ListMatch {
    /// Returns the query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::All => "all",
        }
    }
}

/// Optional filters and paging for the list operation.
///
/// The default query lists the first page with server defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListAccessRulesQuery {
    /// Filter on notes.
    pub notes: Option<String>,
    /// Filter on mode.
    pub mode: Option<AccessRuleMode>,
    /// Filter on configuration target.
    pub configuration_target: Option<ConfigurationTarget>,
    /// Filter on configuration value.
    pub configuration_value: Option<String>,
    /// Page number, starting at 1.
    pub page: Option<u32>,
    /// Rules per page.
    pub per_page: Option<u32>,
    /// Ordering field.
    pub order: Option<ListOrder>,
    /// Ordering direction.
    pub direction: Option<ListDirection>,
    /// Filter combination.
    pub match_mode: Option<ListMatch>,
}

impl ListAccessRulesQuery {
    /// Validates paging bounds.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRulesError::InvalidRequest`] when paging is out of range.
    pub fn validate(&self) -> Result<(), AccessRulesError> {
        if self.page == Some(0) {
            return Err(AccessRulesError::InvalidRequest("page must be at least 1".to_string()));
        }
        if let Some(per_page) = self.per_page
            && !(MIN_PER_PAGE..=MAX_PER_PAGE).contains(&per_page)
        {
            return Err(AccessRulesError::InvalidRequest(format!(
                "per_page must be within {MIN_PER_PAGE}..={MAX_PER_PAGE}"
            )));
        }
        Ok(())
    }

    /// Returns the query-string pairs for the populated fields.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(notes) = &self.notes {
            pairs.push(("notes", notes.clone()));
        }
        if let Some(mode) = self.mode {
            pairs.push(("mode", mode.as_str().to_string()));
        }
        if let Some(target) = self.configuration_target {
            pairs.push(("configuration.target", target.as_str().to_string()));
        }
        if let Some(value) = &self.configuration_value {
            pairs.push(("configuration.value", value.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.as_str().to_string()));
        }
        if let Some(direction) = self.direction {
            pairs.push(("direction", direction.as_str().to_string()));
        }
        if let Some(match_mode) = self.match_mode {
            pairs.push(("match", match_mode.as_str().to_string()));
        }
        pairs
    }
}
