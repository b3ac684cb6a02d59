//! Verification runner tests

use envguard::core::models::{
    Environment, Metadata, TEST_CONTAINER_TYPE, Verification, VerificationEvent,
    VerificationStatus,
};
use envguard::core::ports::VerificationRepository;
use envguard::core::services::RunOutcome;
use envguard::error::{EnvironmentBusy, RunnerError};

use crate::common::fixtures::{DELIVERY_CONFIG, Harness, STAGING, context, integration, smoke, staging};
use crate::common::mocks::ScriptedEvaluator;

fn status_of(harness: &Harness, version: &str, verification: &Verification) -> Option<VerificationStatus> {
    harness
        .verifications
        .get_state(&context(version), verification)
        .unwrap()
        .map(|state| state.status)
}

fn started(id: &str) -> RunOutcome {
    RunOutcome::Started {
        verification_id: id.to_string(),
    }
}

fn still_running(id: &str) -> RunOutcome {
    RunOutcome::StillRunning {
        verification_id: id.to_string(),
    }
}

// =============================================================================
// Starting
// =============================================================================

#[test]
fn test_environment_without_verifications_has_nothing_to_do() {
    let harness = Harness::new();
    let outcome = harness
        .runner
        .run_verifications_for(&context("1.0.0"), &Environment::new(STAGING))
        .unwrap();
    assert_eq!(outcome, RunOutcome::NothingToVerify);
    assert_eq!(harness.evaluator.starts(), 0);
}

#[test]
fn test_first_tick_starts_first_verification() {
    let harness = Harness::new();
    let env = staging(&[smoke(), integration()]);

    let outcome = harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap();

    assert_eq!(outcome, started(&smoke().id));
    assert_eq!(status_of(&harness, "1.0.0", &smoke()), Some(VerificationStatus::Running));
    assert_eq!(status_of(&harness, "1.0.0", &integration()), None);

    let state = harness.verifications.get_state(&context("1.0.0"), &smoke()).unwrap().unwrap();
    assert_eq!(state.metadata["taskId"], "task-1");
    assert_eq!(harness.publisher.started(), 1);
}

#[test]
fn test_running_verification_blocks_the_next_one() {
    let harness = Harness::new();
    let env = staging(&[smoke(), integration()]);
    harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap();

    let outcome = harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap();

    assert_eq!(outcome, still_running(&smoke().id));
    assert_eq!(harness.evaluator.starts(), 1);
    assert_eq!(harness.evaluator.evaluations(), 1);
    assert_eq!(status_of(&harness, "1.0.0", &integration()), None);
}

#[test]
fn test_completion_starts_next_verification_in_same_tick() {
    let harness = Harness::with_evaluator(
        ScriptedEvaluator::new(TEST_CONTAINER_TYPE).then(VerificationStatus::Pass),
    );
    let env = staging(&[smoke(), integration()]);
    harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap();

    let outcome = harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap();

    assert_eq!(outcome, started(&integration().id));
    assert_eq!(status_of(&harness, "1.0.0", &smoke()), Some(VerificationStatus::Pass));
    assert_eq!(status_of(&harness, "1.0.0", &integration()), Some(VerificationStatus::Running));
    assert_eq!(harness.publisher.completed(), 1);
}

#[test]
fn test_all_complete() {
    let harness = Harness::with_evaluator(
        ScriptedEvaluator::new(TEST_CONTAINER_TYPE)
            .then(VerificationStatus::Pass)
            .then(VerificationStatus::Fail),
    );
    let env = staging(&[smoke(), integration()]);
    let ctx = context("1.0.0");

    harness.runner.run_verifications_for(&ctx, &env).unwrap();
    harness.runner.run_verifications_for(&ctx, &env).unwrap();
    let outcome = harness.runner.run_verifications_for(&ctx, &env).unwrap();

    assert_eq!(outcome, RunOutcome::Complete);
    assert!(harness.runner.all_started(&ctx, &env).unwrap());
    assert!(!harness.runner.all_passed(&ctx, &env).unwrap());
    assert_eq!(harness.publisher.completed(), 2);

    // terminal states are never evaluated again
    assert_eq!(harness.runner.run_verifications_for(&ctx, &env).unwrap(), RunOutcome::Complete);
    assert_eq!(harness.evaluator.evaluations(), 2);
}

#[test]
fn test_completed_event_carries_old_and_new_status() {
    let harness = Harness::with_evaluator(
        ScriptedEvaluator::new(TEST_CONTAINER_TYPE).then(VerificationStatus::Error),
    );
    let env = staging(&[smoke()]);
    harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap();
    harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap();

    let completed = harness
        .publisher
        .events()
        .into_iter()
        .find(|e| matches!(e, VerificationEvent::Completed { .. }))
        .unwrap();
    match completed {
        VerificationEvent::Completed {
            old_status,
            new_status,
            verification,
            ..
        } => {
            assert_eq!(old_status, VerificationStatus::Running);
            assert_eq!(new_status, VerificationStatus::Error);
            assert_eq!(verification, smoke());
        },
        VerificationEvent::Started { .. } => unreachable!(),
    }
}

// =============================================================================
// Exclusion
// =============================================================================

#[test]
fn test_deferred_while_deploying() {
    let harness = Harness::new();
    harness.artifacts.mark_deploying("fnord-manifest", STAGING).unwrap();

    let outcome =
        harness.runner.run_verifications_for(&context("1.0.0"), &staging(&[smoke()])).unwrap();

    assert!(matches!(outcome, RunOutcome::Deferred(EnvironmentBusy::ActiveDeployments { .. })));
    assert_eq!(status_of(&harness, "1.0.0", &smoke()), None);
    assert_eq!(harness.evaluator.starts(), 0);
}

#[test]
fn test_deferred_while_another_version_verifies() {
    let harness = Harness::new();
    let env = staging(&[smoke()]);
    harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap();

    let outcome = harness.runner.run_verifications_for(&context("1.0.1"), &env).unwrap();

    match outcome {
        RunOutcome::Deferred(EnvironmentBusy::ActiveVerifications { active, .. }) => {
            assert_eq!(active, vec![context("1.0.0")]);
        },
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(status_of(&harness, "1.0.1", &smoke()), None);
}

#[test]
fn test_deployment_finishing_unblocks_verification() {
    let harness = Harness::new();
    let env = staging(&[smoke()]);
    harness.artifacts.mark_deploying("fnord-manifest", STAGING).unwrap();
    harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap();

    harness.artifacts.mark_deployed("fnord-manifest", STAGING).unwrap();
    let outcome = harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap();

    assert_eq!(outcome, started(&smoke().id));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_unsupported_verification_type_is_an_error() {
    let harness = Harness::new();
    let env = Environment::new(STAGING).with_verification(Verification::new("canary", "c1"));

    let err = harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap_err();

    assert_eq!(
        err.downcast_ref::<RunnerError>(),
        Some(&RunnerError::NoEvaluator {
            kind: "canary".to_string()
        })
    );
}

#[test]
fn test_start_failure_records_nothing_and_releases_lease() {
    let harness = Harness::with_evaluator(ScriptedEvaluator::failing(TEST_CONTAINER_TYPE));
    let env = staging(&[smoke()]);

    let err = harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap_err();

    assert!(format!("{err:#}").contains("container scheduler rejected"));
    assert_eq!(status_of(&harness, "1.0.0", &smoke()), None);
    assert_eq!(harness.publisher.events(), Vec::new());

    // the next tick gets the lease again
    let err = harness.runner.run_verifications_for(&context("1.0.0"), &env).unwrap_err();
    assert!(err.downcast_ref::<EnvironmentBusy>().is_none());
}

#[test]
fn test_environment_mismatch_is_rejected() {
    let harness = Harness::new();
    let production = Environment::new("production").with_verification(smoke());

    let err = harness.runner.run_verifications_for(&context("1.0.0"), &production).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RunnerError>(),
        Some(RunnerError::EnvironmentMismatch { .. })
    ));
}

// =============================================================================
// Retry
// =============================================================================

#[test]
fn test_retry_runs_verification_again() {
    let harness = Harness::with_evaluator(
        ScriptedEvaluator::new(TEST_CONTAINER_TYPE).then(VerificationStatus::Fail),
    );
    let env = staging(&[smoke()]);
    let ctx = context("1.0.0");
    harness.runner.run_verifications_for(&ctx, &env).unwrap();
    harness.runner.run_verifications_for(&ctx, &env).unwrap();
    assert_eq!(status_of(&harness, "1.0.0", &smoke()), Some(VerificationStatus::Fail));

    let status = harness.runner.retry(&ctx, &smoke(), "someone@example.com").unwrap();
    assert_eq!(status, VerificationStatus::NotEvaluated);
    assert!(!harness.runner.all_started(&ctx, &env).unwrap());

    let outcome = harness.runner.run_verifications_for(&ctx, &env).unwrap();
    assert_eq!(outcome, started(&smoke().id));
    assert_eq!(harness.evaluator.starts(), 2);

    let state = harness.verifications.get_state(&ctx, &smoke()).unwrap().unwrap();
    assert_eq!(state.status, VerificationStatus::Running);
    assert_eq!(state.metadata["retryRequestedBy"], "someone@example.com");
    assert_eq!(state.metadata["taskId"], "task-2");
    assert_eq!(state.ended_at, None);
}

// =============================================================================
// Configuration changes
// =============================================================================

#[test]
fn test_removed_pending_verification_stops_blocking_environment() {
    let harness = Harness::new();
    harness
        .verifications
        .update_state(
            &context("1.0.0"),
            &integration(),
            VerificationStatus::Pending,
            Metadata::new(),
            None,
        )
        .unwrap();
    let old = staging(&[smoke(), integration()]);
    let new = staging(&[smoke()]);

    let outcome = harness.runner.run_verifications_for(&context("1.0.1"), &new).unwrap();
    assert!(matches!(outcome, RunOutcome::Deferred(EnvironmentBusy::ActiveVerifications { .. })));
    assert!(harness.enforcer.with_actuation_lease(&context("1.0.1"), || Ok(())).is_err());

    let overridden =
        harness.runner.retire_removed_verifications(DELIVERY_CONFIG, &old, &new).unwrap();

    assert_eq!(overridden, 1);
    assert_eq!(status_of(&harness, "1.0.0", &integration()), Some(VerificationStatus::OverrideFail));
    assert!(harness.enforcer.with_actuation_lease(&context("1.0.1"), || Ok(())).is_ok());
    assert_eq!(
        harness.runner.run_verifications_for(&context("1.0.1"), &new).unwrap(),
        started(&smoke().id)
    );
}

#[test]
fn test_kept_verifications_are_not_overridden() {
    let harness = Harness::new();
    harness
        .verifications
        .update_state(&context("1.0.0"), &smoke(), VerificationStatus::Pending, Metadata::new(), None)
        .unwrap();
    let env = staging(&[smoke(), integration()]);

    let overridden = harness
        .runner
        .retire_removed_verifications(DELIVERY_CONFIG, &env, &staging(&[smoke()]))
        .unwrap();

    assert_eq!(overridden, 0);
    assert_eq!(status_of(&harness, "1.0.0", &smoke()), Some(VerificationStatus::Pending));
}

#[test]
fn test_retiring_across_environments_is_rejected() {
    let harness = Harness::new();
    let production = Environment::new("production").with_verification(smoke());

    let err = harness
        .runner
        .retire_removed_verifications(DELIVERY_CONFIG, &staging(&[smoke()]), &production)
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RunnerError>(),
        Some(RunnerError::EnvironmentMismatch { .. })
    ));
}
