//! Test fixtures and builders
//!
//! Provides the usual delivery config, environment and verifications, plus a
//! [`Harness`] wiring the services to in-memory adapters.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use envguard::adapters::memory::{
    InMemoryArtifactRepository, InMemoryLeaseRepository, InMemoryVerificationRepository,
};
use envguard::config::Settings;
use envguard::core::models::{Environment, TEST_CONTAINER_TYPE, Verification, VerificationContext};
use envguard::core::ports::{
    ArtifactRepository, Clock, ConfigProvider, EnvironmentLeaseRepository, EventPublisher,
    VerificationRepository,
};
use envguard::core::services::{
    EnvironmentExclusionEnforcer, EvaluatorRegistry, VerificationRunner,
};

use super::mocks::{ManualClock, RecordingPublisher, ScriptedEvaluator};

pub const DELIVERY_CONFIG: &str = "fnord-manifest";
pub const STAGING: &str = "staging";
pub const ARTIFACT: &str = "fnord-deb";

pub fn t0() -> DateTime<Utc> {
    "2026-03-01T12:00:00Z".parse().unwrap()
}

pub fn context(version: &str) -> VerificationContext {
    VerificationContext::new(DELIVERY_CONFIG, STAGING, ARTIFACT, version)
}

pub fn smoke() -> Verification {
    Verification::test_container("acme/tests", "stable", None)
}

pub fn integration() -> Verification {
    Verification::test_container("acme/integration", "stable", Some("us-west-2"))
}

pub fn staging(verifications: &[Verification]) -> Environment {
    verifications
        .iter()
        .cloned()
        .fold(Environment::new(STAGING), Environment::with_verification)
}

/// Every service wired to in-memory adapters and a scripted test-container evaluator
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub verifications: Arc<InMemoryVerificationRepository>,
    pub leases: Arc<InMemoryLeaseRepository>,
    pub artifacts: Arc<InMemoryArtifactRepository>,
    pub evaluator: Arc<ScriptedEvaluator>,
    pub publisher: Arc<RecordingPublisher>,
    pub enforcer: Arc<EnvironmentExclusionEnforcer>,
    pub runner: VerificationRunner,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(Settings::default(), ScriptedEvaluator::new(TEST_CONTAINER_TYPE))
    }

    pub fn with_evaluator(evaluator: ScriptedEvaluator) -> Self {
        Self::with(Settings::default(), evaluator)
    }

    pub fn with(settings: Settings, evaluator: ScriptedEvaluator) -> Self {
        let clock = Arc::new(ManualClock::new(t0()));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let verifications = Arc::new(InMemoryVerificationRepository::new(dyn_clock.clone()));
        let leases = Arc::new(InMemoryLeaseRepository::new());
        let artifacts = Arc::new(InMemoryArtifactRepository::new());
        let evaluator = Arc::new(evaluator);
        let publisher = Arc::new(RecordingPublisher::new());

        let config: Arc<dyn ConfigProvider> = Arc::new(settings);
        let dyn_verifications: Arc<dyn VerificationRepository> = verifications.clone();
        let dyn_leases: Arc<dyn EnvironmentLeaseRepository> = leases.clone();
        let dyn_artifacts: Arc<dyn ArtifactRepository> = artifacts.clone();
        let dyn_publisher: Arc<dyn EventPublisher> = publisher.clone();

        let enforcer = Arc::new(EnvironmentExclusionEnforcer::new(
            config,
            dyn_leases,
            dyn_artifacts,
            dyn_verifications.clone(),
            dyn_clock,
        ));
        let runner = VerificationRunner::new(
            dyn_verifications,
            EvaluatorRegistry::new().with(evaluator.clone()),
            enforcer.clone(),
            dyn_publisher,
        );

        Self {
            clock,
            verifications,
            leases,
            artifacts,
            evaluator,
            publisher,
            enforcer,
            runner,
        }
    }
}
