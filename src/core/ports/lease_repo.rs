//! Environment lease repository port

use chrono::{DateTime, Duration, Utc};

use crate::core::models::{Lease, LeaseAttempt, LeaseKey};

/// Storage for expiring environment leases
///
/// Leases are exclusive per `(delivery_config, environment)` whatever their
/// purpose: a live verification lease also excludes an actuation lease and
/// the other way round. The purpose is only recorded on the lease.
///
/// Acquisition must be atomic: of two concurrent callers for the same
/// environment, at most one may be granted a lease while it is live.
#[cfg_attr(test, mockall::automock)]
pub trait EnvironmentLeaseRepository: Send + Sync {
    /// Try to take the lease for `key` until `now + duration`
    ///
    /// An expired lease is taken over. A live one is reported back as
    /// [`LeaseAttempt::Held`].
    fn try_acquire(
        &self,
        key: &LeaseKey,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> anyhow::Result<LeaseAttempt>;

    /// Release a lease previously granted by [`try_acquire`](Self::try_acquire)
    ///
    /// Only removes the row if it still carries `lease.lease_id`.
    fn release(&self, lease: &Lease) -> anyhow::Result<()>;

    /// The live lease for the environment of `key`, if any
    ///
    /// The lease returned may have been taken for another purpose.
    fn current(&self, key: &LeaseKey, now: DateTime<Utc>) -> anyhow::Result<Option<Lease>>;
}
