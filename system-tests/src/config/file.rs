// system-tests/src/config/file.rs
// ============================================================================
// Module: Harness Config File
// Description: Optional TOML file supplying harness settings.
// Purpose: Load local zone settings without requiring exported env vars.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! A small TOML file (`cis.toml` by default) may carry the same values as the
//! environment. Every key is optional; unknown keys are rejected. The file is
//! size-limited and must be UTF-8.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Config file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "cis.toml";
/// Maximum accepted config file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Values read from the local configuration file.
#[derive(Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessFile {
    /// Service endpoint URL.
    #[serde(default)]
    pub api_endpoint: Option<String>,
    /// Owning account reference.
    #[serde(default)]
    pub crn: Option<String>,
    /// Zone identifier.
    #[serde(default)]
    pub zone_id: Option<String>,
    /// Optional bearer token.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl HarnessFile {
    /// Loads and validates a config file that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds the size
    /// limit, is not UTF-8, or fails to parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        Self::parse(&bytes)
    }

    /// Loads a config file when it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file exists but cannot be loaded.
    pub fn load_if_present(path: &Path) -> Result<Option<Self>, ConfigError> {
        match fs::read(path) {
            Ok(bytes) => Self::parse(&bytes).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ConfigError::Io(format!("{}: {err}", path.display()))),
        }
    }

    /// Parses file contents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the contents are oversized, not UTF-8, or
    /// not valid harness TOML.
    pub fn parse(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let file: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        file.validate()?;
        Ok(file)
    }

    /// Rejects empty strings and a zero timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let strings = [
            ("api_endpoint", &self.api_endpoint),
            ("crn", &self.crn),
            ("zone_id", &self.zone_id),
            ("auth_token", &self.auth_token),
        ];
        for (key, value) in strings {
            if value.as_ref().is_some_and(|value| value.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!("{key} must not be empty")));
            }
        }
        if self.timeout_seconds == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for HarnessFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessFile")
            .field("api_endpoint", &self.api_endpoint)
            .field("crn", &self.crn)
            .field("zone_id", &self.zone_id)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}
