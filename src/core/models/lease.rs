//! Environment leases
//!
//! A lease is a short-lived, expiring reservation of an environment for a
//! purpose. While a live lease exists for a key, nobody else can acquire it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why an environment is being reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeasePurpose {
    /// Launching a verification
    Verification,
    /// Actuating a deployment
    Actuation,
}

impl std::fmt::Display for LeasePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Verification => write!(f, "verification"),
            Self::Actuation => write!(f, "actuation"),
        }
    }
}

/// Which environment a lease is requested for, and why
///
/// Only `delivery_config` and `environment` identify the lease row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeaseKey {
    /// Delivery config name
    pub delivery_config: String,
    /// Environment name
    pub environment: String,
    /// What the environment is reserved for; does not partition the lease
    pub purpose: LeasePurpose,
}

impl LeaseKey {
    /// Create a new key
    #[must_use]
    pub fn new(
        delivery_config: impl Into<String>,
        environment: impl Into<String>,
        purpose: LeasePurpose,
    ) -> Self {
        Self {
            delivery_config: delivery_config.into(),
            environment: environment.into(),
            purpose,
        }
    }
}

impl std::fmt::Display for LeaseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}/{}", self.delivery_config, self.environment, self.purpose)
    }
}

/// A granted lease
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    /// Which environment and purpose the lease covers
    pub key: LeaseKey,
    /// Unique per acquisition; release only removes the row holding this id
    pub lease_id: String,
    /// When the lease was granted
    pub acquired_at: DateTime<Utc>,
    /// After this instant another caller may take the lease over
    pub expires_at: DateTime<Utc>,
}

impl Lease {
    /// Whether the lease is still held at `now`
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Result of a lease acquisition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaseAttempt {
    /// The caller now holds the lease
    Granted(Lease),
    /// Somebody else holds a live lease for the key
    Held(Lease),
}
