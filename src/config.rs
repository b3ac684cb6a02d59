//! Configuration management
//!
//! Static settings come from a TOML file:
//!
//! ```toml
//! [exclusion]
//! enabled = true
//! lease_duration_secs = 60
//!
//! [unhappy]
//! max_retries = 5
//! time_between_retries_secs = 600
//! # give_up_after = 20
//! ```
//!
//! [`EnvOverrides`] layers `ENVGUARD_*` environment variables on top of any
//! [`ConfigProvider`], read fresh on every call.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::core::ports::ConfigProvider;
use crate::error::ConfigError;

/// Overrides `[exclusion] enabled`
pub const ENV_ENFORCEMENT_ENABLED: &str = "ENVGUARD_EXCLUSION_ENABLED";
/// Overrides `[exclusion] lease_duration_secs`
pub const ENV_LEASE_DURATION_SECS: &str = "ENVGUARD_LEASE_DURATION_SECS";
/// Overrides `[unhappy] max_retries`
pub const ENV_MAX_RETRIES: &str = "ENVGUARD_UNHAPPY_MAX_RETRIES";
/// Overrides `[unhappy] time_between_retries_secs`
pub const ENV_TIME_BETWEEN_RETRIES_SECS: &str = "ENVGUARD_UNHAPPY_TIME_BETWEEN_RETRIES_SECS";
/// Overrides `[unhappy] give_up_after`
pub const ENV_GIVE_UP_AFTER: &str = "ENVGUARD_UNHAPPY_GIVE_UP_AFTER";

/// Static envguard settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Deployment/verification exclusion
    #[serde(default)]
    pub exclusion: ExclusionSettings,
    /// Unhappy resource veto
    #[serde(default)]
    pub unhappy: UnhappySettings,
}

/// `[exclusion]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSettings {
    /// Whether leases and conflict checks are enforced
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Lease time-to-live in seconds
    #[serde(default = "default_lease_duration_secs")]
    pub lease_duration_secs: u64,
}

const fn default_enabled() -> bool {
    true
}

const fn default_lease_duration_secs() -> u64 {
    60
}

impl Default for ExclusionSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            lease_duration_secs: default_lease_duration_secs(),
        }
    }
}

/// `[unhappy]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnhappySettings {
    /// Actions tolerated against one diff before rechecks are rationed
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Cool-down between rechecks, in seconds
    #[serde(default = "default_time_between_retries_secs")]
    pub time_between_retries_secs: u64,
    /// Stop rechecking once this many actions were taken against one diff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub give_up_after: Option<u32>,
}

const fn default_max_retries() -> u32 {
    5
}

const fn default_time_between_retries_secs() -> u64 {
    10 * 60
}

impl Default for UnhappySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            time_between_retries_secs: default_time_between_retries_secs(),
            give_up_after: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load settings from a TOML file, falling back to defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

fn seconds(secs: u64) -> Duration {
    i64::try_from(secs).ok().and_then(Duration::try_seconds).unwrap_or(Duration::MAX)
}

impl ConfigProvider for Settings {
    fn enforcement_enabled(&self) -> bool {
        self.exclusion.enabled
    }

    fn lease_duration(&self) -> Duration {
        seconds(self.exclusion.lease_duration_secs)
    }

    fn max_retries(&self) -> u32 {
        self.unhappy.max_retries
    }

    fn time_between_retries(&self) -> Duration {
        seconds(self.unhappy.time_between_retries_secs)
    }

    fn give_up_after(&self) -> Option<u32> {
        self.unhappy.give_up_after
    }
}

/// Environment variables take precedence over the wrapped provider
///
/// Unparsable values are logged and ignored.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides<P> {
    inner: P,
}

impl<P: ConfigProvider> EnvOverrides<P> {
    /// Wrap a provider
    #[must_use]
    pub const fn new(inner: P) -> Self {
        Self { inner }
    }

    /// The wrapped provider
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }
}

fn env_override<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring invalid value {raw:?} for {name}");
            None
        },
    }
}

impl<P: ConfigProvider> ConfigProvider for EnvOverrides<P> {
    fn enforcement_enabled(&self) -> bool {
        env_override(ENV_ENFORCEMENT_ENABLED).unwrap_or_else(|| self.inner.enforcement_enabled())
    }

    fn lease_duration(&self) -> Duration {
        env_override(ENV_LEASE_DURATION_SECS)
            .map_or_else(|| self.inner.lease_duration(), seconds)
    }

    fn max_retries(&self) -> u32 {
        env_override(ENV_MAX_RETRIES).unwrap_or_else(|| self.inner.max_retries())
    }

    fn time_between_retries(&self) -> Duration {
        env_override(ENV_TIME_BETWEEN_RETRIES_SECS)
            .map_or_else(|| self.inner.time_between_retries(), seconds)
    }

    fn give_up_after(&self) -> Option<u32> {
        env_override(ENV_GIVE_UP_AFTER).or_else(|| self.inner.give_up_after())
    }
}
