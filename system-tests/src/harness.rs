// system-tests/src/harness.rs
// ============================================================================
// Module: Access Rule Harness
// Description: Checked wrappers around the zone access-rule operations.
// Purpose: Turn each client call into a pass/fail step with echo checks.
// Dependencies: thiserror, zone-access-rules
// ============================================================================

//! ## Overview
//! [`AccessRuleHarness`] issues exactly one client call per operation,
//! requires status `200` with `success == true`, and verifies that the service
//! echoes what was asked for. Any deviation becomes a [`HarnessError`], so a
//! scenario body can propagate with `?` and fail on the first broken step.
//! The harness keeps no local state; every read goes to the service.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;

use thiserror::Error;
use zone_access_rules::AccessRule;
use zone_access_rules::AccessRuleId;
use zone_access_rules::AccessRuleMode;
use zone_access_rules::AccessRulesError;
use zone_access_rules::CreateAccessRuleRequest;
use zone_access_rules::DetailedResponse;
use zone_access_rules::ListAccessRulesQuery;
use zone_access_rules::RuleConfiguration;
use zone_access_rules::UpdateAccessRuleRequest;
use zone_access_rules::ZoneAccessRulesApi;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Status every successful call must return.
const EXPECTED_STATUS: u16 = 200;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures raised by harness steps.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The client call itself failed.
    #[error(transparent)]
    Client(#[from] AccessRulesError),
    /// The call succeeded but the response did not match expectations.
    #[error("{operation}: {field} mismatch (expected {expected}, got {actual})")]
    Mismatch {
        /// Harness operation that observed the mismatch.
        operation: &'static str,
        /// Field that differed.
        field: &'static str,
        /// Expected value.
        expected: String,
        /// Observed value.
        actual: String,
    },
}

impl HarnessError {
    /// Returns true when the underlying client error is `NotFound`.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Client(AccessRulesError::NotFound { .. }))
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Checked access-rule operations against one zone.
pub struct AccessRuleHarness<A> {
    /// Client bound to the zone under test.
    api: A,
}

impl<A: ZoneAccessRulesApi> AccessRuleHarness<A> {
    /// Wraps a bound client.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self {
            api,
        }
    }

    /// Returns the wrapped client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Creates a rule and checks the echoed mode and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the call fails or the echo differs.
    pub fn create(
        &self,
        mode: AccessRuleMode,
        notes: &str,
        configuration: RuleConfiguration,
    ) -> Result<AccessRule, HarnessError> {
        const OP: &str = "create";
        let request = CreateAccessRuleRequest::new(mode, configuration).with_notes(notes);
        let rule = accept(OP, self.api.create_zone_access_rule(&request)?)?;
        if rule.id.is_blank() {
            return Err(mismatch(OP, "id", "non-empty id", "empty"));
        }
        expect_eq(OP, "mode", request.mode, rule.mode)?;
        expect_eq(OP, "configuration", &request.configuration, &rule.configuration)?;
        Ok(rule)
    }

    /// Fetches a rule and checks the echoed id.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the call fails or the echo differs.
    pub fn get(&self, id: &AccessRuleId) -> Result<AccessRule, HarnessError> {
        const OP: &str = "get";
        let rule = accept(OP, self.api.get_zone_access_rule(id)?)?;
        expect_eq(OP, "id", id, &rule.id)?;
        Ok(rule)
    }

    /// Updates mode and notes and checks the echoed id and mode.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the call fails or the echo differs.
    pub fn update(
        &self,
        id: &AccessRuleId,
        mode: AccessRuleMode,
        notes: &str,
    ) -> Result<AccessRule, HarnessError> {
        const OP: &str = "update";
        let request = UpdateAccessRuleRequest::new(mode, notes);
        let rule = accept(OP, self.api.update_zone_access_rule(id, &request)?)?;
        expect_eq(OP, "id", id, &rule.id)?;
        expect_eq(OP, "mode", mode, rule.mode)?;
        Ok(rule)
    }

    /// Deletes a rule and checks the echoed id.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the call fails or the echo differs.
    pub fn delete(&self, id: &AccessRuleId) -> Result<AccessRuleId, HarnessError> {
        const OP: &str = "delete";
        let deleted = accept(OP, self.api.delete_zone_access_rule(id)?)?;
        expect_eq(OP, "id", id, &deleted.id)?;
        Ok(deleted.id)
    }

    /// Lists every rule in the zone with the default query.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the call fails.
    pub fn list_all(&self) -> Result<Vec<AccessRule>, HarnessError> {
        accept("list_all", self.api.list_all_zone_access_rules(&ListAccessRulesQuery::default())?)
    }

    /// Deletes every listed rule and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] on the first failed list or delete.
    pub fn clean_zone(&self) -> Result<usize, HarnessError> {
        let rules = self.list_all()?;
        for rule in &rules {
            self.delete(&rule.id)?;
        }
        Ok(rules.len())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Requires status `200` and `success == true`, then yields the payload.
fn accept<T>(operation: &'static str, response: DetailedResponse<T>) -> Result<T, HarnessError> {
    if response.status_code != EXPECTED_STATUS {
        return Err(mismatch(operation, "status_code", EXPECTED_STATUS, response.status_code));
    }
    if !response.result.success {
        let actual = response
            .result
            .errors
            .first()
            .map_or_else(|| "false".to_string(), |err| format!("false ({})", err.message));
        return Err(mismatch(operation, "success", true, actual));
    }
    Ok(response.into_payload())
}

/// Fails with [`HarnessError::Mismatch`] when the values differ.
pub(crate) fn expect_eq<T: PartialEq + Display>(
    operation: &'static str,
    field: &'static str,
    expected: T,
    actual: T,
) -> Result<(), HarnessError> {
    if expected == actual {
        Ok(())
    } else {
        Err(mismatch(operation, field, expected, actual))
    }
}

/// Builds a mismatch error.
pub(crate) fn mismatch(
    operation: &'static str,
    field: &'static str,
    expected: impl Display,
    actual: impl Display,
) -> HarnessError {
    HarnessError::Mismatch {
        operation,
        field,
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}
