//! Verification status
//!
//! Absence of a persisted state means "not evaluated yet".

use serde::{Deserialize, Serialize};

/// Status of a single verification against a single artifact version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// Explicitly reset; will be started again
    NotEvaluated,
    /// Accepted but not yet launched
    Pending,
    /// Launched, waiting for the evaluator to report a result
    Running,
    /// The check passed
    Pass,
    /// The check failed
    Fail,
    /// The check could not produce a result
    Error,
    /// A user marked the check as passed
    OverridePass,
    /// A user marked the check as failed
    OverrideFail,
}

impl VerificationStatus {
    /// Terminal statuses are never evaluated again
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Pass | Self::Fail | Self::Error | Self::OverridePass | Self::OverrideFail)
    }

    /// In-flight statuses block other verifications and deployments
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// Passing statuses, including user overrides
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass | Self::OverridePass)
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotEvaluated => "NOT_EVALUATED",
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Error => "ERROR",
            Self::OverridePass => "OVERRIDE_PASS",
            Self::OverrideFail => "OVERRIDE_FAIL",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "NOT_EVALUATED" => Ok(Self::NotEvaluated),
            "PENDING" => Ok(Self::Pending),
            "RUNNING" => Ok(Self::Running),
            "PASS" => Ok(Self::Pass),
            "FAIL" => Ok(Self::Fail),
            "ERROR" => Ok(Self::Error),
            "OVERRIDE_PASS" => Ok(Self::OverridePass),
            "OVERRIDE_FAIL" => Ok(Self::OverrideFail),
            _ => Err(format!("Invalid verification status: {s}")),
        }
    }
}
