//! envguard - Deployment safety coordination for continuous delivery
//!
//! This library keeps verifications and deployments of an environment from
//! stepping on each other, drives post-deployment verifications one at a
//! time, and backs off from resources whose remediation does not stick.
//!
//! ## Architecture
//!
//! - `core::models` - verification contexts, statuses, leases, veto verdicts
//! - `core::ports` - storage, evaluator, clock and event interfaces
//! - `core::services` - [`VerificationRunner`], [`EnvironmentExclusionEnforcer`], [`UnhappyVeto`]
//! - `adapters` - in-memory repositories, system clock, logging publisher

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapters;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use config::{EnvOverrides, Settings};
pub use core::models::{
    ActionState, Environment, Lease, LeaseKey, LeasePurpose, Metadata, Resource, Verification,
    VerificationContext, VerificationEvent, VerificationStatus, VetoResponse,
};
pub use core::services::{
    EnvironmentExclusionEnforcer, EvaluatorRegistry, RunOutcome, UnhappyVeto, VerificationRunner,
};
pub use error::{EnforcementError, EnvironmentBusy, RunnerError};
