//! Domain models for envguard
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`VerificationContext`] - "this artifact version in this environment"
//! - [`Verification`] - "check it like this"
//! - [`VerificationStatus`] / [`ActionState`] - "this is how the check went"
//! - [`LeaseKey`] / [`Lease`] - "this environment is reserved for this purpose"
//! - [`Resource`] / [`VetoResponse`] - "may we act on this resource right now?"

mod action_state;
mod context;
mod event;
mod lease;
mod resource;
mod status;
mod verification;

pub use action_state::{ActionState, Metadata};
pub use context::{Environment, VerificationContext};
pub use event::VerificationEvent;
pub use lease::{Lease, LeaseAttempt, LeaseKey, LeasePurpose};
pub use resource::{Recheck, Resource, VetoResponse};
pub use status::VerificationStatus;
pub use verification::{TEST_CONTAINER_TYPE, Verification};
