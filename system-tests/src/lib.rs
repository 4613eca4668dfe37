// system-tests/src/lib.rs
// ============================================================================
// Module: Zone Access Rules System Tests Library
// Description: Harness, scenarios and configuration for access-rule testing.
// Purpose: Drive a bound zone client through checked end-to-end scenarios.
// Dependencies: zone-access-rules, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! This crate hosts the access-rule harness used by the runner binary and the
//! integration suites in `system-tests/tests`. Configuration is loaded once
//! from the environment and an optional local file, a client is bound to the
//! configured zone, and scenarios run sequentially with zone cleanup before
//! and after each one.
//! Security posture: configuration and service responses are untrusted; tokens
//! never appear in reports or `Debug` output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod harness;
pub mod scenarios;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use harness::AccessRuleHarness;
pub use harness::HarnessError;
pub use scenarios::Scenario;
pub use scenarios::ScenarioOutcome;
pub use scenarios::ScenarioReport;
pub use scenarios::ScenarioRunner;

// ============================================================================
// SECTION: Tests
// ============================================================================
