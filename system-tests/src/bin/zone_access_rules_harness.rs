// system-tests/src/bin/zone_access_rules_harness.rs
// ============================================================================
// Module: Zone Access Rules Harness Runner
// Description: Command-line runner for access-rule scenarios.
// Purpose: Run scenarios against a configured zone and report JSON lines.
// Dependencies: clap, serde_json, system-tests, zone-access-rules
// ============================================================================

//! Scenario runner binary.
//!
//! Loads configuration once, binds a client to the configured zone, runs the
//! selected scenarios in order and writes one JSON report per scenario to
//! stdout. Exit codes: `0` when no scenario failed, `1` when any failed, `2`
//! when the configuration is present but invalid.

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use system_tests::AccessRuleHarness;
use system_tests::Scenario;
use system_tests::ScenarioReport;
use system_tests::ScenarioRunner;
use system_tests::config::ConfigError;
use system_tests::config::HarnessConfig;
use zone_access_rules::FileAuditSink;
use zone_access_rules::RequestAuditSink;
use zone_access_rules::StderrAuditSink;
use zone_access_rules::ZoneAccessRulesClient;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Runner command line.
#[derive(Parser, Debug)]
#[command(name = "zone-access-rules-harness", version)]
struct Cli {
    /// Local configuration file (overrides `ACCESS_RULES_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Scenario to run; repeat to select several. Defaults to all.
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<Scenario>,
}

/// Exit code for configuration that is present but invalid.
const EXIT_INVALID_CONFIG: u8 = 2;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Runner entry point returning an exit code.
fn main() -> ExitCode {
    let cli = Cli::parse();
    let scenarios = if cli.scenarios.is_empty() { Scenario::ALL.to_vec() } else { cli.scenarios };

    let runner = match build_runner(cli.config.as_deref()) {
        Ok(runner) => runner,
        Err(message) => return emit_error(&message, ExitCode::from(EXIT_INVALID_CONFIG)),
    };

    let reports = runner.run_all(&scenarios);
    for report in &reports {
        if let Err(err) = write_report(report) {
            return emit_error(&format!("stdout write failed: {err}"), ExitCode::FAILURE);
        }
    }
    if reports.iter().any(|report| report.outcome.is_failure()) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads configuration and binds a runner, or a skipping runner when unset.
fn build_runner(path: Option<&Path>) -> Result<ScenarioRunner<ZoneAccessRulesClient>, String> {
    let config = match HarnessConfig::load_from(path) {
        Ok(config) => config,
        Err(err @ ConfigError::ConfigurationMissing { .. }) => {
            return Ok(ScenarioRunner::skipped(err.to_string()));
        }
        Err(err) => return Err(err.to_string()),
    };
    let audit: Arc<dyn RequestAuditSink> = match &config.audit_log {
        Some(path) => Arc::new(
            FileAuditSink::new(path)
                .map_err(|err| format!("audit log {}: {err}", path.display()))?,
        ),
        None => Arc::new(StderrAuditSink),
    };
    let client = ZoneAccessRulesClient::new_instance(config.to_client_config())
        .map_err(|err| err.to_string())?
        .with_audit_sink(audit);
    Ok(ScenarioRunner::new(AccessRuleHarness::new(client)))
}

/// Writes one report as a JSON line.
fn write_report(report: &ScenarioReport) -> std::io::Result<()> {
    let line = serde_json::to_string(report).map_err(std::io::Error::other)?;
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{line}")
}

/// Emits an error message to stderr and returns the given exit code.
fn emit_error(message: &str, code: ExitCode) -> ExitCode {
    let _ = writeln!(std::io::stderr(), "zone-access-rules-harness: {message}");
    code
}
