// system-tests/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Centralized configuration for the access-rule harness.
// Purpose: Provide typed access to zone settings from env and a local file.
// Dependencies: serde, thiserror, toml, zone-access-rules
// ============================================================================

//! ## Overview
//! Harness configuration is read once at process start from environment
//! variables layered over an optional TOML file, and mapped into a small
//! typed structure passed to client construction.
//! Security posture: environment and file inputs are untrusted; tokens are
//! redacted from `Debug` output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod file;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::EnvLayer;
pub use env::HarnessConfig;
pub use env::HarnessEnv;
pub use env::read_env_strict;
pub use file::DEFAULT_CONFIG_FILE;
pub use file::HarnessFile;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required values are absent; scenarios are skipped, not failed.
    #[error("configuration missing: {}", keys.join(", "))]
    ConfigurationMissing {
        /// Environment keys with no value in any layer.
        keys: Vec<&'static str>,
    },
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns true when the error means "not configured" rather than "misconfigured".
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::ConfigurationMissing { .. })
    }
}
