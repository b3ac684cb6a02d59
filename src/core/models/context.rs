//! Verification context
//!
//! Identifies one unit of verification work: an artifact version that has been
//! deployed into an environment of a delivery config.

use serde::{Deserialize, Serialize};

use super::Verification;

/// Key for all verification lookups
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerificationContext {
    /// Name of the delivery config
    pub delivery_config: String,
    /// Name of the environment within the delivery config
    pub environment: String,
    /// Reference of the artifact deployed to the environment
    pub artifact_reference: String,
    /// Version of the artifact deployed to the environment
    pub version: String,
}

impl VerificationContext {
    /// Create a new context
    #[must_use]
    pub fn new(
        delivery_config: impl Into<String>,
        environment: impl Into<String>,
        artifact_reference: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            delivery_config: delivery_config.into(),
            environment: environment.into(),
            artifact_reference: artifact_reference.into(),
            version: version.into(),
        }
    }

    /// Compact form for log lines, e.g. `myapp-manifest:staging:myapp-deb@1.2.3`
    #[must_use]
    pub fn short_name(&self) -> String {
        format!(
            "{}:{}:{}@{}",
            self.delivery_config, self.environment, self.artifact_reference, self.version
        )
    }

    /// Whether this context targets the given environment
    #[must_use]
    pub fn is_in(&self, delivery_config: &str, environment: &str) -> bool {
        self.delivery_config == delivery_config && self.environment == environment
    }
}

impl std::fmt::Display for VerificationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.short_name())
    }
}

/// An environment and the verifications configured for it
///
/// The order of `verify_with` is significant: verifications are started
/// strictly in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Environment name
    pub name: String,
    /// Verifications run after each deployment, in order
    #[serde(default, rename = "verifyWith")]
    pub verify_with: Vec<Verification>,
}

impl Environment {
    /// Create an environment with no verifications
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verify_with: Vec::new(),
        }
    }

    /// Builder-style: append a verification
    #[must_use]
    pub fn with_verification(mut self, verification: Verification) -> Self {
        self.verify_with.push(verification);
        self
    }
}
