//! Port traits (interfaces) for external dependencies
//!
//! These traits define the boundaries between the coordination logic and the
//! systems it relies on: storage, evaluators, event sinks, clocks and runtime
//! configuration.
//!
//! Implementations live in the `adapters` module.
//!
//! ## Design Principle
//!
//! Services depend only on these traits, never on concrete implementations.
//! Every port is `Send + Sync` so a single service instance can be shared by
//! a scheduler driving many environments at once.

mod artifact_repo;
mod clock;
mod config;
mod diff_fingerprint_repo;
mod evaluator;
mod events;
mod lease_repo;
mod unhappy_veto_repo;
mod verification_repo;

pub use artifact_repo::ArtifactRepository;
pub use clock::Clock;
pub use config::ConfigProvider;
pub use diff_fingerprint_repo::DiffFingerprintRepository;
pub use evaluator::VerificationEvaluator;
pub use events::EventPublisher;
pub use lease_repo::EnvironmentLeaseRepository;
pub use unhappy_veto_repo::UnhappyVetoRepository;
pub use verification_repo::VerificationRepository;

#[cfg(test)]
pub use artifact_repo::MockArtifactRepository;
#[cfg(test)]
pub use clock::MockClock;
#[cfg(test)]
pub use config::MockConfigProvider;
#[cfg(test)]
pub use diff_fingerprint_repo::MockDiffFingerprintRepository;
#[cfg(test)]
pub use evaluator::MockVerificationEvaluator;
#[cfg(test)]
pub use events::MockEventPublisher;
#[cfg(test)]
pub use lease_repo::MockEnvironmentLeaseRepository;
#[cfg(test)]
pub use unhappy_veto_repo::MockUnhappyVetoRepository;
#[cfg(test)]
pub use verification_repo::MockVerificationRepository;
