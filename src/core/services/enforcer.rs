//! Environment exclusion enforcer
//!
//! Guards the two kinds of activity that must not overlap in an environment:
//! launching a verification and actuating a deployment. Callers wrap their
//! action in [`EnvironmentExclusionEnforcer::with_verification_lease`] or
//! [`EnvironmentExclusionEnforcer::with_actuation_lease`]; the action runs only
//! while a lease is held and no conflicting activity was found.
//!
//! Verifications are serialized against deployments and against other
//! verifications. Deployments are only checked against verifications, since
//! concurrent deployment machinery is coordinated elsewhere.
//!
//! Leases are not renewed. An action that outlives the lease duration is no
//! longer protected; the duration is an exclusivity window, not a deadline.

use std::sync::Arc;

use crate::core::models::{
    Lease, LeaseAttempt, LeaseKey, LeasePurpose, VerificationContext, VerificationStatus,
};
use crate::core::ports::{
    ArtifactRepository, Clock, ConfigProvider, EnvironmentLeaseRepository, VerificationRepository,
};
use crate::error::{EnforcementError, EnvironmentBusy};

/// Grants guarded execution scopes per environment
pub struct EnvironmentExclusionEnforcer {
    config: Arc<dyn ConfigProvider>,
    leases: Arc<dyn EnvironmentLeaseRepository>,
    artifacts: Arc<dyn ArtifactRepository>,
    verifications: Arc<dyn VerificationRepository>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for EnvironmentExclusionEnforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentExclusionEnforcer")
            .field("enforcement_enabled", &self.config.enforcement_enabled())
            .finish_non_exhaustive()
    }
}

impl EnvironmentExclusionEnforcer {
    /// Create an enforcer
    #[must_use]
    pub const fn new(
        config: Arc<dyn ConfigProvider>,
        leases: Arc<dyn EnvironmentLeaseRepository>,
        artifacts: Arc<dyn ArtifactRepository>,
        verifications: Arc<dyn VerificationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            leases,
            artifacts,
            verifications,
            clock,
        }
    }

    /// Run `action` if no deployment or verification is active in the environment
    ///
    /// The lease is held for the whole action and released on every exit
    /// path, including a panicking action.
    pub fn with_verification_lease<T, F>(
        &self,
        context: &VerificationContext,
        action: F,
    ) -> Result<T, EnforcementError>
    where
        F: FnOnce() -> anyhow::Result<T>,
    {
        if !self.config.enforcement_enabled() {
            log::debug!("Exclusion disabled, verifying {} unguarded", context.short_name());
            return Ok(action()?);
        }

        let _guard = self.acquire(context, LeasePurpose::Verification)?;
        self.ensure_no_active_deployments(context)?;
        self.ensure_no_active_verifications(context)?;

        Ok(action()?)
    }

    /// Run `action` if no verification is active in the environment
    ///
    /// Deployments already in progress do not block actuation.
    pub fn with_actuation_lease<T, F>(
        &self,
        context: &VerificationContext,
        action: F,
    ) -> Result<T, EnforcementError>
    where
        F: FnOnce() -> anyhow::Result<T>,
    {
        if !self.config.enforcement_enabled() {
            log::debug!("Exclusion disabled, actuating {} unguarded", context.short_name());
            return Ok(action()?);
        }

        let _guard = self.acquire(context, LeasePurpose::Actuation)?;
        self.ensure_no_active_verifications(context)?;

        Ok(action()?)
    }

    fn acquire(
        &self,
        context: &VerificationContext,
        purpose: LeasePurpose,
    ) -> Result<LeaseGuard<'_>, EnforcementError> {
        let key = LeaseKey::new(&context.delivery_config, &context.environment, purpose);
        let now = self.clock.now();
        match self.leases.try_acquire(&key, now, self.config.lease_duration())? {
            LeaseAttempt::Granted(lease) => {
                log::debug!("Acquired lease {} until {}", lease.key, lease.expires_at);
                Ok(LeaseGuard {
                    leases: self.leases.as_ref(),
                    lease,
                })
            },
            LeaseAttempt::Held(existing) => {
                log::info!(
                    "Environment lease {} is held until {}, deferring {}",
                    existing.key,
                    existing.expires_at,
                    context.short_name()
                );
                Err(EnvironmentBusy::LeaseUnavailable {
                    delivery_config: context.delivery_config.clone(),
                    environment: context.environment.clone(),
                    purpose,
                    expires_at: existing.expires_at,
                }
                .into())
            },
        }
    }

    fn ensure_no_active_deployments(
        &self,
        context: &VerificationContext,
    ) -> Result<(), EnforcementError> {
        if self.artifacts.is_deploying_to(&context.delivery_config, &context.environment)? {
            log::info!(
                "Environment {} in {} is being deployed to, not verifying {}",
                context.environment,
                context.delivery_config,
                context.version
            );
            return Err(EnvironmentBusy::ActiveDeployments {
                delivery_config: context.delivery_config.clone(),
                environment: context.environment.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn ensure_no_active_verifications(
        &self,
        context: &VerificationContext,
    ) -> Result<(), EnforcementError> {
        let mut active = Vec::new();
        for status in [VerificationStatus::Pending, VerificationStatus::Running] {
            for ctx in self.verifications.contexts_with_status(
                &context.delivery_config,
                &context.environment,
                status,
            )? {
                if !active.contains(&ctx) {
                    active.push(ctx);
                }
            }
        }

        if active.is_empty() {
            return Ok(());
        }

        active.sort();
        log::info!(
            "Environment {} in {} has {} active verification(s)",
            context.environment,
            context.delivery_config,
            active.len()
        );
        Err(EnvironmentBusy::ActiveVerifications {
            delivery_config: context.delivery_config.clone(),
            environment: context.environment.clone(),
            active,
        }
        .into())
    }
}

/// Releases the lease when dropped
struct LeaseGuard<'a> {
    leases: &'a dyn EnvironmentLeaseRepository,
    lease: Lease,
}

impl Drop for LeaseGuard<'_> {
    fn drop(&mut self) {
        match self.leases.release(&self.lease) {
            Ok(()) => log::debug!("Released lease {}", self.lease.key),
            // the lease expires on its own
            Err(e) => log::warn!("Failed to release lease {}: {e:#}", self.lease.key),
        }
    }
}
