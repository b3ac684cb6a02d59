//! Coordination services
//!
//! Orchestration logic that operates on domain models through ports.
//!
//! - [`runner`] - Drive the verifications of an environment one step at a time
//! - [`enforcer`] - Mutual exclusion between verifications and deployments
//! - [`unhappy_veto`] - Backoff for remediation that keeps failing
//! - [`registry`] - Evaluator lookup by verification type

pub mod enforcer;
pub mod registry;
pub mod runner;
pub mod unhappy_veto;

pub use enforcer::EnvironmentExclusionEnforcer;
pub use registry::EvaluatorRegistry;
pub use runner::{RunOutcome, VerificationRunner};
pub use unhappy_veto::{UNHAPPY_VETO_NAME, UnhappyVeto};
