// system-tests/tests/suites/stub_zone.rs
// ============================================================================
// Module: Stub Zone Tests
// Description: Harness and scenarios driven over HTTP against a stub zone.
// Purpose: Validate lifecycle checks, cleanup, and failure reporting end to end.
// Dependencies: system-tests helpers, zone-access-rules
// ============================================================================

//! ## Overview
//! Runs the real client, harness, and scenario runner against the in-memory
//! zone stub.
//! Invariants:
//! - Every scenario leaves the zone empty.
//! - Service faults surface as failed reports, never as panics.

use std::error::Error;
use std::sync::Arc;

use helpers::artifacts::TestReporter;
use helpers::zone_stub::ZoneStubHandle;
use helpers::zone_stub::ZoneStubOptions;
use helpers::zone_stub::spawn_zone_stub;
use system_tests::AccessRuleHarness;
use system_tests::HarnessError;
use system_tests::Scenario;
use system_tests::ScenarioOutcome;
use system_tests::ScenarioRunner;
use system_tests::scenarios::CREATE_NOTES;
use system_tests::scenarios::MODE_FIXTURES;
use system_tests::scenarios::UPDATE_NOTES;
use system_tests::scenarios::distinct_update_mode;
use zone_access_rules::AccessRuleMode;
use zone_access_rules::AccessRulesError;
use zone_access_rules::ClientConfig;
use zone_access_rules::FileAuditSink;
use zone_access_rules::RuleConfiguration;
use zone_access_rules::ZoneAccessRulesClient;

use crate::helpers;

type TestResult = Result<(), Box<dyn Error>>;
type StubHarness = AccessRuleHarness<ZoneAccessRulesClient>;

fn harness_for(config: ClientConfig) -> Result<StubHarness, Box<dyn Error>> {
    Ok(AccessRuleHarness::new(ZoneAccessRulesClient::new_instance(config)?))
}

fn stub_harness(stub: &ZoneStubHandle) -> Result<StubHarness, Box<dyn Error>> {
    harness_for(stub.client_config())
}

#[test]
fn rule_lifecycle_round_trips_through_stub() -> TestResult {
    let mut reporter = TestReporter::new("rule_lifecycle_round_trips_through_stub")?;
    let stub = spawn_zone_stub(ZoneStubOptions::default())?;
    let harness = stub_harness(&stub)?;

    let (mode, address) = MODE_FIXTURES[0];
    let created = harness.create(mode, CREATE_NOTES, RuleConfiguration::ip(address))?;
    require_eq(&created.notes.as_str(), &CREATE_NOTES, "created notes")?;
    let fetched = harness.get(&created.id)?;
    require_eq(&fetched, &created, "fetched rule")?;

    let next = distinct_update_mode(mode);
    let updated = harness.update(&created.id, next, UPDATE_NOTES)?;
    require_eq(&updated.configuration, &created.configuration, "configuration after update")?;
    require_eq(&harness.get(&created.id)?.mode, &next, "mode after update")?;

    require_eq(&harness.delete(&created.id)?, &created.id, "deleted id")?;
    match harness.get(&created.id) {
        Err(err) if err.is_not_found() => {}
        other => return Err(format!("expected not found after delete, got {other:?}").into()),
    }
    require_eq(&stub.rule_count(), &0, "rules left in zone")?;

    reporter.finish("pass", vec!["create/get/update/delete round trip".to_string()], Vec::new())?;
    Ok(())
}

#[test]
fn update_leaves_sibling_rules_untouched() -> TestResult {
    let mut reporter = TestReporter::new("update_leaves_sibling_rules_untouched")?;
    let stub = spawn_zone_stub(ZoneStubOptions::default())?;
    let harness = stub_harness(&stub)?;

    let mut created = Vec::new();
    for (mode, address) in MODE_FIXTURES {
        created.push(harness.create(mode, CREATE_NOTES, RuleConfiguration::ip(address))?);
    }
    let target = &created[1];
    harness.update(&target.id, distinct_update_mode(target.mode), UPDATE_NOTES)?;

    for rule in created.iter().filter(|rule| rule.id != target.id) {
        let fetched = harness.get(&rule.id)?;
        require_eq(&fetched.mode, &rule.mode, "sibling mode")?;
        require_eq(&fetched.notes, &rule.notes, "sibling notes")?;
    }
    require_eq(&harness.clean_zone()?, &MODE_FIXTURES.len(), "rules cleaned")?;

    reporter.finish("pass", vec!["sibling rules unchanged by update".to_string()], Vec::new())?;
    Ok(())
}

#[test]
fn list_returns_every_created_rule() -> TestResult {
    let mut reporter = TestReporter::new("list_returns_every_created_rule")?;
    let stub = spawn_zone_stub(ZoneStubOptions::default())?;
    let harness = stub_harness(&stub)?;

    let mut expected = Vec::new();
    for (mode, address) in MODE_FIXTURES {
        expected.push(harness.create(mode, CREATE_NOTES, RuleConfiguration::ip(address))?.id);
    }
    let mut listed: Vec<_> = harness.list_all()?.into_iter().map(|rule| rule.id).collect();
    listed.sort();
    expected.sort();
    require_eq(&listed, &expected, "listed ids")?;
    harness.clean_zone()?;

    reporter.finish("pass", vec![format!("listed {} rules", expected.len())], Vec::new())?;
    Ok(())
}

#[test]
fn scenarios_pass_and_clean_leftover_rules() -> TestResult {
    let mut reporter = TestReporter::new("scenarios_pass_and_clean_leftover_rules")?;
    let stub = spawn_zone_stub(ZoneStubOptions::default())?;
    stub.seed_rules(3);
    let runner = ScenarioRunner::new(stub_harness(&stub)?);

    let reports = runner.run_all(&Scenario::ALL);
    let report_path = reporter.artifacts().write_reports(&reports)?;
    require_eq(&reports.len(), &Scenario::ALL.len(), "report count")?;
    for report in &reports {
        require_eq(&report.outcome, &ScenarioOutcome::Passed, &report.name)?;
    }
    require(reports[0].rules_cleaned == 3, "setup cleanup should remove seeded rules")?;
    require_eq(&stub.rule_count(), &0, "rules left in zone")?;

    reporter.finish(
        "pass",
        vec!["all scenarios passed against stub zone".to_string()],
        vec![report_path.display().to_string()],
    )?;
    Ok(())
}

#[test]
fn stale_updates_fail_mode_scenarios() -> TestResult {
    let mut reporter = TestReporter::new("stale_updates_fail_mode_scenarios")?;
    let stub = spawn_zone_stub(ZoneStubOptions {
        stale_updates: true,
        ..ZoneStubOptions::default()
    })?;
    let runner = ScenarioRunner::new(stub_harness(&stub)?);

    let reports = runner.run_all(&Scenario::ALL);
    let report_path = reporter.artifacts().write_reports(&reports)?;
    for report in &reports {
        let expect_failure = report.name != Scenario::ListRulesAction.as_str();
        match &report.outcome {
            ScenarioOutcome::Failed {
                reason,
            } if expect_failure => {
                require(reason.contains("update: mode mismatch"), format!("reason: {reason}"))?;
            }
            ScenarioOutcome::Passed if !expect_failure => {}
            other => return Err(format!("{}: unexpected outcome {other:?}", report.name).into()),
        }
    }
    require_eq(&stub.rule_count(), &0, "teardown should empty the zone")?;

    reporter.finish(
        "pass",
        vec!["stale updates reported as mode mismatches".to_string()],
        vec![report_path.display().to_string()],
    )?;
    Ok(())
}

#[test]
fn bearer_token_is_forwarded() -> TestResult {
    let mut reporter = TestReporter::new("bearer_token_is_forwarded")?;
    let stub = spawn_zone_stub(ZoneStubOptions {
        required_token: Some("stub-token".to_string()),
        ..ZoneStubOptions::default()
    })?;

    let anonymous = ScenarioRunner::new(stub_harness(&stub)?);
    match anonymous.run_scenario(Scenario::ListRulesAction).outcome {
        ScenarioOutcome::Failed {
            reason,
        } => require(
            reason.starts_with("setup cleanup: request failed with status 401"),
            format!("reason: {reason}"),
        )?,
        other => return Err(format!("expected auth failure, got {other:?}").into()),
    }

    let mut config = stub.client_config();
    config.auth_token = Some("stub-token".to_string());
    let authorized = ScenarioRunner::new(harness_for(config)?);
    let report = authorized.run_scenario(Scenario::ListRulesAction);
    require_eq(&report.outcome, &ScenarioOutcome::Passed, "authorized list scenario")?;

    reporter.finish("pass", vec!["token required and accepted".to_string()], Vec::new())?;
    Ok(())
}

#[test]
fn unknown_zone_fails_as_request_error() -> TestResult {
    let mut reporter = TestReporter::new("unknown_zone_fails_as_request_error")?;
    let stub = spawn_zone_stub(ZoneStubOptions::default())?;
    let mut config = stub.client_config();
    config.zone_identifier = "zone-elsewhere".to_string();
    let harness = harness_for(config)?;

    match harness.list_all() {
        Err(HarnessError::Client(AccessRulesError::RequestFailed {
            status,
            message,
        })) => {
            require_eq(&status, &404, "status")?;
            require_eq(&message.as_str(), &"Could not route to zone", "message")?;
        }
        other => return Err(format!("expected request failure, got {other:?}").into()),
    }
    match harness.create(AccessRuleMode::Block, CREATE_NOTES, RuleConfiguration::ip("10.0.0.1")) {
        Err(HarnessError::Client(AccessRulesError::RequestFailed {
            status: 404,
            ..
        })) => {}
        other => return Err(format!("expected request failure, got {other:?}").into()),
    }

    reporter.finish("pass", vec!["unknown zone rejected".to_string()], Vec::new())?;
    Ok(())
}

#[test]
fn audit_log_records_every_request() -> TestResult {
    let mut reporter = TestReporter::new("audit_log_records_every_request")?;
    let stub = spawn_zone_stub(ZoneStubOptions {
        required_token: Some("audit-secret".to_string()),
        ..ZoneStubOptions::default()
    })?;
    let audit_path = reporter.artifacts().root().join("audit.jsonl");
    let mut config = stub.client_config();
    config.auth_token = Some("audit-secret".to_string());
    let client = ZoneAccessRulesClient::new_instance(config)?
        .with_audit_sink(Arc::new(FileAuditSink::new(&audit_path)?));
    let runner = ScenarioRunner::new(AccessRuleHarness::new(client));

    let report = runner.run_scenario(Scenario::ConfigActionMatrix);
    require_eq(&report.outcome, &ScenarioOutcome::Passed, "config scenario")?;

    let log = std::fs::read_to_string(&audit_path)?;
    let lines: Vec<&str> = log.lines().collect();
    require_eq(&lines.len(), &stub.requests().len(), "audit lines per request")?;
    require(!log.contains("audit-secret"), "audit log must not contain the token")?;
    for line in &lines {
        let event: serde_json::Value = serde_json::from_str(line)?;
        require_eq(&event["outcome"], &serde_json::json!("ok"), "audit outcome")?;
    }

    reporter.finish(
        "pass",
        vec![format!("{} audit events", lines.len())],
        vec![audit_path.display().to_string()],
    )?;
    Ok(())
}

fn require(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into().into()) }
}

fn require_eq<T: PartialEq + std::fmt::Debug>(left: &T, right: &T, context: &str) -> TestResult {
    if left == right {
        Ok(())
    } else {
        Err(format!("{context}: left={left:?} right={right:?}").into())
    }
}
