//! In-memory repositories
//!
//! Thread-safe implementations of every storage port, suitable for tests,
//! simulations and single-process deployments. Each repository guards its
//! state with one mutex, which makes every operation atomic.

mod artifact;
mod diff_fingerprint;
mod lease;
mod unhappy_veto;
mod verification;

pub use artifact::InMemoryArtifactRepository;
pub use diff_fingerprint::InMemoryDiffFingerprintRepository;
pub use lease::InMemoryLeaseRepository;
pub use unhappy_veto::InMemoryUnhappyVetoRepository;
pub use verification::{InMemoryVerificationRepository, RETRY_REQUESTED_BY};

use std::sync::{Mutex, MutexGuard};

/// Lock a repository's state, surfacing poisoning as an error
fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> anyhow::Result<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| anyhow::anyhow!("{what} state lock poisoned"))
}
