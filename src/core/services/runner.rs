//! Verification runner
//!
//! Drives the verifications of one environment forward by one step per call.
//! A scheduler invokes [`VerificationRunner::run_verifications_for`] once per
//! tick for every environment that has a freshly deployed artifact version.
//!
//! Per verification the state machine is:
//!
//! ```text
//! (absent) --start--> RUNNING --evaluate(complete)--> PASS | FAIL | ERROR | OVERRIDE_*
//! ```
//!
//! At most one verification of an environment runs at a time, and
//! verifications start in the order they are declared.

use std::sync::Arc;

use anyhow::Context as _;

use super::{EnvironmentExclusionEnforcer, EvaluatorRegistry};
use crate::core::models::{
    Environment, Verification, VerificationContext, VerificationEvent, VerificationStatus,
};
use crate::core::ports::{EventPublisher, VerificationRepository};
use crate::error::{EnforcementError, EnvironmentBusy, RunnerError};

/// What a single runner step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The environment has no verifications configured
    NothingToVerify,
    /// A verification is still running; nothing else was started
    StillRunning {
        /// The running verification
        verification_id: String,
    },
    /// A verification was started
    Started {
        /// The started verification
        verification_id: String,
    },
    /// The next verification could not be started right now
    Deferred(EnvironmentBusy),
    /// Every configured verification has reached a terminal status
    Complete,
}

/// Orchestrates verification execution for one environment at a time
pub struct VerificationRunner {
    verifications: Arc<dyn VerificationRepository>,
    evaluators: EvaluatorRegistry,
    enforcer: Arc<EnvironmentExclusionEnforcer>,
    publisher: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for VerificationRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationRunner")
            .field("evaluators", &self.evaluators)
            .field("enforcer", &self.enforcer)
            .finish_non_exhaustive()
    }
}

impl VerificationRunner {
    /// Create a runner
    #[must_use]
    pub const fn new(
        verifications: Arc<dyn VerificationRepository>,
        evaluators: EvaluatorRegistry,
        enforcer: Arc<EnvironmentExclusionEnforcer>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            verifications,
            evaluators,
            enforcer,
            publisher,
        }
    }

    /// Advance the verifications of `environment` for the artifact version in `context`
    ///
    /// Running verifications are evaluated first. If one is still running
    /// nothing else happens. Otherwise the first verification without a
    /// state is started under a verification lease.
    ///
    /// Evaluator failures are returned as errors and are not retried here; the
    /// next tick re-reads the persisted state.
    pub fn run_verifications_for(
        &self,
        context: &VerificationContext,
        environment: &Environment,
    ) -> anyhow::Result<RunOutcome> {
        if context.environment != environment.name {
            return Err(RunnerError::EnvironmentMismatch {
                expected: context.environment.clone(),
                actual: environment.name.clone(),
            }
            .into());
        }

        if environment.verify_with.is_empty() {
            return Ok(RunOutcome::NothingToVerify);
        }

        let mut statuses = Vec::with_capacity(environment.verify_with.len());
        for verification in &environment.verify_with {
            statuses.push((verification, self.latest_status(context, verification)?));
        }

        if let Some((running, _)) =
            statuses.iter().find(|(_, status)| status.is_some_and(VerificationStatus::is_active))
        {
            log::debug!(
                "Verification {running} against {} is still running",
                context.short_name()
            );
            return Ok(RunOutcome::StillRunning {
                verification_id: running.id.clone(),
            });
        }

        let Some((next, observed)) = statuses.iter().find(|(_, status)| is_outstanding(*status))
        else {
            log::debug!("All verifications against {} are complete", context.short_name());
            return Ok(RunOutcome::Complete);
        };

        match self.enforcer.with_verification_lease(context, || self.start(context, next, *observed)) {
            Ok(true) => Ok(RunOutcome::Started {
                verification_id: next.id.clone(),
            }),
            Ok(false) => Ok(RunOutcome::StillRunning {
                verification_id: next.id.clone(),
            }),
            Err(EnforcementError::Busy(busy)) => {
                log::info!("Not starting {next} against {}: {busy}", context.short_name());
                Ok(RunOutcome::Deferred(busy))
            },
            Err(EnforcementError::Failed(e)) => Err(e),
        }
    }

    /// Whether every configured verification passed for the context
    pub fn all_passed(
        &self,
        context: &VerificationContext,
        environment: &Environment,
    ) -> anyhow::Result<bool> {
        let states = self.verifications.get_states(context)?;
        Ok(environment
            .verify_with
            .iter()
            .all(|v| states.get(&v.id).is_some_and(|state| state.status.is_pass())))
    }

    /// Whether every configured verification has been started for the context
    pub fn all_started(
        &self,
        context: &VerificationContext,
        environment: &Environment,
    ) -> anyhow::Result<bool> {
        let states = self.verifications.get_states(context)?;
        Ok(environment.verify_with.iter().all(|v| {
            states
                .get(&v.id)
                .is_some_and(|state| state.status != VerificationStatus::NotEvaluated)
        }))
    }

    /// Request a re-run of a verification on behalf of `user`
    ///
    /// The verification is started again on a later tick, once it is the
    /// first outstanding one.
    pub fn retry(
        &self,
        context: &VerificationContext,
        verification: &Verification,
        user: &str,
    ) -> anyhow::Result<VerificationStatus> {
        log::info!("{user} requested a retry of {verification} against {}", context.short_name());
        self.verifications.reset_state(context, verification, user)
    }

    /// Settle verifications dropped from an environment's configuration
    ///
    /// Nothing evaluates a removed verification any more, so a `PENDING`
    /// state it left behind would block every verification and deployment of
    /// the environment. Such states are marked `OVERRIDE_FAIL`. Returns how
    /// many states were overridden.
    pub fn retire_removed_verifications(
        &self,
        delivery_config: &str,
        old: &Environment,
        new: &Environment,
    ) -> anyhow::Result<usize> {
        if old.name != new.name {
            return Err(RunnerError::EnvironmentMismatch {
                expected: old.name.clone(),
                actual: new.name.clone(),
            }
            .into());
        }

        let mut overridden = 0;
        for removed in old
            .verify_with
            .iter()
            .filter(|v| !new.verify_with.iter().any(|kept| kept.id == v.id))
        {
            log::debug!(
                "Verification {removed} removed from {} in {delivery_config}, overriding pending states",
                old.name
            );
            overridden += self.verifications.override_pending(
                delivery_config,
                &old.name,
                &removed.id,
                VerificationStatus::OverrideFail,
            )?;
        }
        if overridden > 0 {
            log::info!(
                "Marked {overridden} pending state(s) of removed verifications in {} as {}",
                old.name,
                VerificationStatus::OverrideFail
            );
        }
        Ok(overridden)
    }

    /// The current status of a verification, evaluating it if it is in flight
    ///
    /// A newly terminal status is persisted and announced exactly once.
    fn latest_status(
        &self,
        context: &VerificationContext,
        verification: &Verification,
    ) -> anyhow::Result<Option<VerificationStatus>> {
        let Some(old_state) = self.verifications.get_state(context, verification)? else {
            return Ok(None);
        };
        if !old_state.status.is_active() {
            return Ok(Some(old_state.status));
        }

        let evaluator = self.evaluators.evaluator_for(&verification.kind)?;
        let new_state = evaluator
            .evaluate(context, verification, &old_state)
            .inspect_err(|e| {
                log::error!(
                    "Evaluating {verification} against {} failed: {e:#}",
                    context.short_name()
                );
            })
            .with_context(|| {
                format!("failed to evaluate {verification} against {}", context.short_name())
            })?;

        if !new_state.status.is_complete() {
            return Ok(Some(old_state.status));
        }

        let transitioned = self.verifications.transition_state(
            context,
            verification,
            Some(old_state.status),
            new_state.status,
            new_state.metadata.clone(),
            new_state.link.clone(),
        )?;
        if !transitioned {
            log::debug!(
                "Verification {verification} against {} was completed by another tick",
                context.short_name()
            );
            return Ok(Some(new_state.status));
        }
        log::info!(
            "Verification {verification} against {} completed: {} -> {}",
            context.short_name(),
            old_state.status,
            new_state.status
        );
        self.publisher.publish(VerificationEvent::Completed {
            context: context.clone(),
            verification: verification.clone(),
            old_status: old_state.status,
            new_status: new_state.status,
            metadata: new_state.metadata,
        });

        Ok(Some(new_state.status))
    }

    /// Launch a verification whose status was observed as `observed`
    ///
    /// Returns `false` if another tick recorded a state in the meantime.
    fn start(
        &self,
        context: &VerificationContext,
        verification: &Verification,
        observed: Option<VerificationStatus>,
    ) -> anyhow::Result<bool> {
        let evaluator = self.evaluators.evaluator_for(&verification.kind)?;
        let metadata = evaluator
            .start(context, verification)
            .inspect_err(|e| {
                log::error!(
                    "Starting {verification} against {} failed: {e:#}",
                    context.short_name()
                );
            })
            .with_context(|| {
                format!("failed to start {verification} against {}", context.short_name())
            })?;

        let transitioned = self.verifications.transition_state(
            context,
            verification,
            observed,
            VerificationStatus::Running,
            metadata.clone(),
            None,
        )?;
        if !transitioned {
            log::warn!(
                "Verification {verification} against {} was started concurrently",
                context.short_name()
            );
            return Ok(false);
        }
        log::info!("Started verification {verification} against {}", context.short_name());
        self.publisher.publish(VerificationEvent::Started {
            context: context.clone(),
            verification: verification.clone(),
            metadata,
        });
        Ok(true)
    }
}

const fn is_outstanding(status: Option<VerificationStatus>) -> bool {
    matches!(status, None | Some(VerificationStatus::NotEvaluated))
}
