//! Error types
//!
//! "Not now, try later" conditions are kept apart from genuine defects so
//! callers can apply a different retry policy to each.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::models::{LeasePurpose, VerificationContext};

/// The environment is currently being acted on by someone else
///
/// Always recoverable: retry on the next scheduling tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentBusy {
    /// A deployment to the environment is in progress
    #[error("environment {environment} in {delivery_config} is currently being deployed to")]
    ActiveDeployments {
        /// Delivery config name
        delivery_config: String,
        /// Environment name
        environment: String,
    },

    /// Verifications are pending or running in the environment
    #[error(
        "environment {environment} in {delivery_config} has active verifications against {}",
        versions(.active)
    )]
    ActiveVerifications {
        /// Delivery config name
        delivery_config: String,
        /// Environment name
        environment: String,
        /// Contexts with in-flight verifications
        active: Vec<VerificationContext>,
    },

    /// Another holder has a live lease on the environment
    #[error(
        "environment {environment} in {delivery_config} is leased for {purpose} until {expires_at}"
    )]
    LeaseUnavailable {
        /// Delivery config name
        delivery_config: String,
        /// Environment name
        environment: String,
        /// Purpose of the requested lease
        purpose: LeasePurpose,
        /// When the current holder's lease expires
        expires_at: DateTime<Utc>,
    },
}

impl EnvironmentBusy {
    /// Delivery config the conflict was detected in
    #[must_use]
    pub fn delivery_config(&self) -> &str {
        match self {
            Self::ActiveDeployments { delivery_config, .. }
            | Self::ActiveVerifications { delivery_config, .. }
            | Self::LeaseUnavailable { delivery_config, .. } => delivery_config,
        }
    }

    /// Environment the conflict was detected in
    #[must_use]
    pub fn environment(&self) -> &str {
        match self {
            Self::ActiveDeployments { environment, .. }
            | Self::ActiveVerifications { environment, .. }
            | Self::LeaseUnavailable { environment, .. } => environment,
        }
    }
}

fn versions(active: &[VerificationContext]) -> String {
    active
        .iter()
        .map(|ctx| format!("{}@{}", ctx.artifact_reference, ctx.version))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure of a guarded execution scope
#[derive(Debug, Error)]
pub enum EnforcementError {
    /// The environment is busy; nothing was executed
    #[error(transparent)]
    Busy(#[from] EnvironmentBusy),

    /// Repository I/O or the guarded action itself failed
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl EnforcementError {
    /// Whether this is a "try again later" condition
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

/// Errors raised by the verification runner itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    /// A verification of this type is configured but no evaluator handles it
    #[error("no evaluator registered for verification type {kind}")]
    NoEvaluator {
        /// The unsupported verification type
        kind: String,
    },

    /// The environment handed to the runner is not the one the context names
    #[error("context targets environment {expected} but verifications of {actual} were supplied")]
    EnvironmentMismatch {
        /// Environment named by the context
        expected: String,
        /// Environment whose verifications were passed
        actual: String,
    },
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`Settings`](crate::config::Settings)
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
