// system-tests/src/scenarios.rs
// ============================================================================
// Module: Access Rule Scenarios
// Description: Ordered fixtures and scenario runner for zone access rules.
// Purpose: Exercise create/update/get/delete/list with cleanup around each run.
// Dependencies: serde, zone-access-rules
// ============================================================================

//! ## Overview
//! Scenarios drive an [`AccessRuleHarness`] through fixed, ordered fixture
//! lists. [`ScenarioRunner`] cleans the zone before and after every scenario
//! and reports one of three outcomes: passed, failed or skipped. A runner
//! built without configuration reports every scenario as skipped.
//! Invariants:
//! - Fixture order is fixed; nothing is derived from map iteration.
//! - Teardown cleanup runs even when setup or the body failed.
//! - A teardown failure after a passing body fails the scenario.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use zone_access_rules::AccessRuleMode;
use zone_access_rules::ConfigurationTarget;
use zone_access_rules::RuleConfiguration;
use zone_access_rules::ZoneAccessRulesApi;

use crate::harness::AccessRuleHarness;
use crate::harness::HarnessError;
use crate::harness::expect_eq;
use crate::harness::mismatch;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Notes attached to every created rule.
pub const CREATE_NOTES: &str = "This rule is added because of event X that occurred on date xyz";
/// Notes attached to every update.
pub const UPDATE_NOTES: &str = "This rule is updated because of event X that occurred on date xyz";

/// One rule per mode, each matching a distinct single address.
pub const MODE_FIXTURES: [(AccessRuleMode, &str); 4] = [
    (AccessRuleMode::Block, "192.168.1.45"),
    (AccessRuleMode::Challenge, "192.168.1.46"),
    (AccessRuleMode::Whitelist, "192.168.1.47"),
    (AccessRuleMode::JsChallenge, "192.168.1.48"),
];

/// One rule per configuration target.
pub const CONFIG_FIXTURES: [(ConfigurationTarget, &str); 3] = [
    (ConfigurationTarget::Ip, "192.168.1.14"),
    (ConfigurationTarget::IpRange, "192.169.1.0/24"),
    (ConfigurationTarget::Asn, "AS12345"),
];

/// Mode used when creating configuration fixtures.
pub const CONFIG_CREATE_MODE: AccessRuleMode = AccessRuleMode::Block;
/// Mode configuration fixtures are updated to.
pub const CONFIG_UPDATE_MODE: AccessRuleMode = AccessRuleMode::Challenge;

/// Returns the mode a rule created with `created` is updated to.
///
/// The result is the next mode in fixture order, wrapping around, so it always
/// differs from `created`.
#[must_use]
pub const fn distinct_update_mode(created: AccessRuleMode) -> AccessRuleMode {
    match created {
        AccessRuleMode::Block => AccessRuleMode::Challenge,
        AccessRuleMode::Challenge => AccessRuleMode::Whitelist,
        AccessRuleMode::Whitelist => AccessRuleMode::JsChallenge,
        AccessRuleMode::JsChallenge => AccessRuleMode::Block,
    }
}

// ============================================================================
// SECTION: Scenarios
// ============================================================================

/// Named scenarios in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Create, update, get and delete one rule per mode.
    ModeActionMatrix,
    /// Create, update, get and delete one rule per configuration target.
    ConfigActionMatrix,
    /// Create one rule per mode, list, then delete each.
    ListRulesAction,
}

impl Scenario {
    /// All scenarios in execution order.
    pub const ALL: [Self; 3] =
        [Self::ModeActionMatrix, Self::ConfigActionMatrix, Self::ListRulesAction];

    /// Returns the scenario name used in reports and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ModeActionMatrix => "mode_action_matrix",
            Self::ConfigActionMatrix => "config_action_matrix",
            Self::ListRulesAction => "list_rules_action",
        }
    }

    /// Runs the scenario body against a harness.
    ///
    /// # Errors
    ///
    /// Returns the first [`HarnessError`] raised by any step.
    pub fn execute<A: ZoneAccessRulesApi>(
        self,
        harness: &AccessRuleHarness<A>,
    ) -> Result<(), HarnessError> {
        match self {
            Self::ModeActionMatrix => mode_action_matrix(harness),
            Self::ConfigActionMatrix => config_action_matrix(harness),
            Self::ListRulesAction => list_rules_action(harness),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == value)
            .ok_or_else(|| format!("unknown scenario: {value}"))
    }
}

/// Cycles every mode fixture through create, update, get and delete.
fn mode_action_matrix<A: ZoneAccessRulesApi>(
    harness: &AccessRuleHarness<A>,
) -> Result<(), HarnessError> {
    for (mode, value) in MODE_FIXTURES {
        let configuration = RuleConfiguration::ip(value);
        let created = harness.create(mode, CREATE_NOTES, configuration)?;
        let update_mode = distinct_update_mode(mode);
        harness.update(&created.id, update_mode, UPDATE_NOTES)?;
        let fetched = harness.get(&created.id)?;
        expect_eq("get", "mode", update_mode, fetched.mode)?;
        expect_eq("get", "configuration", &created.configuration, &fetched.configuration)?;
        harness.delete(&created.id)?;
    }
    Ok(())
}

/// Cycles every configuration fixture through create, update, get and delete.
fn config_action_matrix<A: ZoneAccessRulesApi>(
    harness: &AccessRuleHarness<A>,
) -> Result<(), HarnessError> {
    for (target, value) in CONFIG_FIXTURES {
        let configuration = RuleConfiguration::new(target, value);
        let created = harness.create(CONFIG_CREATE_MODE, CREATE_NOTES, configuration)?;
        harness.update(&created.id, CONFIG_UPDATE_MODE, UPDATE_NOTES)?;
        let fetched = harness.get(&created.id)?;
        expect_eq("get", "mode", CONFIG_UPDATE_MODE, fetched.mode)?;
        expect_eq("get", "configuration", &created.configuration, &fetched.configuration)?;
        harness.delete(&created.id)?;
    }
    Ok(())
}

/// Creates every mode fixture, checks the listing, then deletes them.
fn list_rules_action<A: ZoneAccessRulesApi>(
    harness: &AccessRuleHarness<A>,
) -> Result<(), HarnessError> {
    let mut created = Vec::with_capacity(MODE_FIXTURES.len());
    for (mode, value) in MODE_FIXTURES {
        created.push(harness.create(mode, CREATE_NOTES, RuleConfiguration::ip(value))?.id);
    }
    let listed: BTreeSet<String> =
        harness.list_all()?.into_iter().map(|rule| rule.id.as_str().to_string()).collect();
    for id in &created {
        if !listed.contains(id.as_str()) {
            return Err(mismatch("list_all", "rule ids", id, "absent"));
        }
    }
    for id in &created {
        harness.delete(id)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Result of one scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    /// Every step succeeded.
    Passed,
    /// A step or cleanup failed.
    Failed {
        /// First failure observed.
        reason: String,
    },
    /// The scenario could not run, typically for missing configuration.
    Skipped {
        /// Why the scenario did not run.
        reason: String,
    },
}

impl ScenarioOutcome {
    /// Returns true for [`ScenarioOutcome::Failed`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Report emitted for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Outcome of the run.
    #[serde(flatten)]
    pub outcome: ScenarioOutcome,
    /// Rules removed by setup and teardown cleanup.
    pub rules_cleaned: usize,
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs scenarios with zone cleanup around each one.
pub struct ScenarioRunner<A> {
    /// Harness, or the reason every scenario is skipped.
    target: Result<AccessRuleHarness<A>, String>,
}

impl<A: ZoneAccessRulesApi> ScenarioRunner<A> {
    /// Creates a runner bound to a harness.
    #[must_use]
    pub const fn new(harness: AccessRuleHarness<A>) -> Self {
        Self {
            target: Ok(harness),
        }
    }

    /// Creates a runner that skips every scenario.
    #[must_use]
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            target: Err(reason.into()),
        }
    }

    /// Returns the harness when the runner is configured.
    #[must_use]
    pub fn harness(&self) -> Option<&AccessRuleHarness<A>> {
        self.target.as_ref().ok()
    }

    /// Runs `body` between setup and teardown cleanup.
    pub fn run<F>(&self, name: &str, body: F) -> ScenarioReport
    where
        F: FnOnce(&AccessRuleHarness<A>) -> Result<(), HarnessError>,
    {
        let harness = match &self.target {
            Ok(harness) => harness,
            Err(reason) => {
                return ScenarioReport {
                    name: name.to_string(),
                    outcome: ScenarioOutcome::Skipped {
                        reason: reason.clone(),
                    },
                    rules_cleaned: 0,
                };
            }
        };

        let mut rules_cleaned = 0;
        let body_result = match harness.clean_zone() {
            Ok(removed) => {
                rules_cleaned += removed;
                body(harness).map_err(|err| err.to_string())
            }
            Err(err) => Err(format!("setup cleanup: {err}")),
        };
        let teardown = harness.clean_zone();
        if let Ok(removed) = &teardown {
            rules_cleaned += removed;
        }

        let outcome = match (body_result, teardown) {
            (Ok(()), Ok(_)) => ScenarioOutcome::Passed,
            (Ok(()), Err(err)) => ScenarioOutcome::Failed {
                reason: format!("teardown cleanup: {err}"),
            },
            (Err(reason), _) => ScenarioOutcome::Failed {
                reason,
            },
        };
        ScenarioReport {
            name: name.to_string(),
            outcome,
            rules_cleaned,
        }
    }

    /// Runs one named scenario.
    pub fn run_scenario(&self, scenario: Scenario) -> ScenarioReport {
        self.run(scenario.as_str(), |harness| scenario.execute(harness))
    }

    /// Runs scenarios in the given order.
    pub fn run_all(&self, scenarios: &[Scenario]) -> Vec<ScenarioReport> {
        scenarios.iter().map(|scenario| self.run_scenario(*scenario)).collect()
    }
}
