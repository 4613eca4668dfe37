// system-tests/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed configuration for the access-rule harness.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: zone-access-rules
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8, empty values and malformed timeouts fail
//! closed. Required keys that are absent from both the environment and the
//! local file produce [`ConfigError::ConfigurationMissing`], which callers
//! treat as a skip rather than a failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use zone_access_rules::ClientConfig;
use zone_access_rules::client::DEFAULT_TIMEOUT_MS;

use super::ConfigError;
use super::file::DEFAULT_CONFIG_FILE;
use super::file::HarnessFile;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Service endpoint URL.
    ApiEndpoint,
    /// Owning account reference.
    Crn,
    /// Zone identifier.
    ZoneId,
    /// Optional bearer token.
    AuthToken,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Optional JSON-lines audit log path.
    AuditLog,
    /// Optional local configuration file path.
    ConfigPath,
}

impl HarnessEnv {
    /// Every harness key.
    pub const ALL: [Self; 7] = [
        Self::ApiEndpoint,
        Self::Crn,
        Self::ZoneId,
        Self::AuthToken,
        Self::TimeoutSeconds,
        Self::AuditLog,
        Self::ConfigPath,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiEndpoint => "API_ENDPOINT",
            Self::Crn => "CRN",
            Self::ZoneId => "ZONE_ID",
            Self::AuthToken => "CIS_AUTH_TOKEN",
            Self::TimeoutSeconds => "ACCESS_RULES_TIMEOUT_SEC",
            Self::AuditLog => "ACCESS_RULES_AUDIT_LOG",
            Self::ConfigPath => "ACCESS_RULES_CONFIG",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Raw values read from the process environment.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct EnvLayer {
    /// `API_ENDPOINT`.
    pub api_endpoint: Option<String>,
    /// `CRN`.
    pub crn: Option<String>,
    /// `ZONE_ID`.
    pub zone_id: Option<String>,
    /// `CIS_AUTH_TOKEN`.
    pub auth_token: Option<String>,
    /// `ACCESS_RULES_TIMEOUT_SEC`, already validated.
    pub timeout: Option<Duration>,
    /// `ACCESS_RULES_AUDIT_LOG`.
    pub audit_log: Option<PathBuf>,
    /// `ACCESS_RULES_CONFIG`.
    pub config_path: Option<PathBuf>,
}

impl EnvLayer {
    /// Reads every harness key from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is not valid UTF-8, is
    /// empty, or is a malformed timeout.
    pub fn read() -> Result<Self, ConfigError> {
        let timeout = read_env_nonempty(HarnessEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(HarnessEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        Ok(Self {
            api_endpoint: read_env_nonempty(HarnessEnv::ApiEndpoint.as_str())?,
            crn: read_env_nonempty(HarnessEnv::Crn.as_str())?,
            zone_id: read_env_nonempty(HarnessEnv::ZoneId.as_str())?,
            auth_token: read_env_nonempty(HarnessEnv::AuthToken.as_str())?,
            timeout,
            audit_log: read_env_nonempty(HarnessEnv::AuditLog.as_str())?.map(PathBuf::from),
            config_path: read_env_nonempty(HarnessEnv::ConfigPath.as_str())?.map(PathBuf::from),
        })
    }
}

impl fmt::Debug for EnvLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvLayer")
            .field("api_endpoint", &self.api_endpoint)
            .field("crn", &self.crn)
            .field("zone_id", &self.zone_id)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("audit_log", &self.audit_log)
            .field("config_path", &self.config_path)
            .finish()
    }
}

/// Fully resolved harness configuration.
///
/// # Invariants
/// - `api_endpoint`, `crn` and `zone_id` are non-empty.
/// - `timeout` is greater than zero.
#[derive(Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Service endpoint URL.
    pub api_endpoint: String,
    /// Owning account reference.
    pub crn: String,
    /// Zone identifier.
    pub zone_id: String,
    /// Optional bearer token.
    pub auth_token: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Optional JSON-lines audit log path.
    pub audit_log: Option<PathBuf>,
}

impl HarnessConfig {
    /// Loads configuration from the environment and the optional local file.
    ///
    /// The file path is taken from `ACCESS_RULES_CONFIG` when set, otherwise
    /// [`DEFAULT_CONFIG_FILE`] in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigurationMissing`] when required values are
    /// absent, and other [`ConfigError`] variants when inputs are malformed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration, preferring an explicit file path when given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading fails; see [`HarnessConfig::load`].
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env = EnvLayer::read()?;
        let file = match path.map(Path::to_path_buf).or_else(|| env.config_path.clone()) {
            Some(explicit) => Some(HarnessFile::load(&explicit)?),
            None => HarnessFile::load_if_present(Path::new(DEFAULT_CONFIG_FILE))?,
        };
        Self::from_layers(file, env)
    }

    /// Merges file and environment layers; environment values win.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigurationMissing`] naming every absent
    /// required key, or [`ConfigError::Invalid`] for malformed file values.
    pub fn from_layers(file: Option<HarnessFile>, env: EnvLayer) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();
        file.validate()?;
        let timeout = match (env.timeout, file.timeout_seconds) {
            (Some(timeout), _) => timeout,
            (None, Some(secs)) => Duration::from_secs(secs),
            (None, None) => Duration::from_millis(DEFAULT_TIMEOUT_MS),
        };
        let api_endpoint = env.api_endpoint.or(file.api_endpoint);
        let crn = env.crn.or(file.crn);
        let zone_id = env.zone_id.or(file.zone_id);

        let mut missing = Vec::new();
        if api_endpoint.is_none() {
            missing.push(HarnessEnv::ApiEndpoint.as_str());
        }
        if crn.is_none() {
            missing.push(HarnessEnv::Crn.as_str());
        }
        if zone_id.is_none() {
            missing.push(HarnessEnv::ZoneId.as_str());
        }
        let (Some(api_endpoint), Some(crn), Some(zone_id)) = (api_endpoint, crn, zone_id) else {
            return Err(ConfigError::ConfigurationMissing {
                keys: missing,
            });
        };
        Ok(Self {
            api_endpoint,
            crn,
            zone_id,
            auth_token: env.auth_token.or(file.auth_token),
            timeout,
            audit_log: env.audit_log,
        })
    }

    /// Builds the client binding for this configuration.
    #[must_use]
    pub fn to_client_config(&self) -> ClientConfig {
        let mut config =
            ClientConfig::new(self.api_endpoint.clone(), self.crn.clone(), self.zone_id.clone());
        config.auth_token.clone_from(&self.auth_token);
        config.timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        config
    }
}

impl fmt::Debug for HarnessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("api_endpoint", &self.api_endpoint)
            .field("crn", &self.crn)
            .field("zone_id", &self.zone_id)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("audit_log", &self.audit_log)
            .finish()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Invalid(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let trimmed = raw.trim();
    let secs: u64 = trimmed.parse().map_err(|_| {
        ConfigError::Invalid(format!("{name} must be a positive integer number of seconds"))
    })?;
    if secs == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}
