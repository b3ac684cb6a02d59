//! In-memory environment lease repository

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::lock;
use crate::core::models::{Lease, LeaseAttempt, LeaseKey};
use crate::core::ports::EnvironmentLeaseRepository;

/// One lease row per (delivery config, environment)
#[derive(Debug, Default)]
pub struct InMemoryLeaseRepository {
    leases: Mutex<HashMap<(String, String), Lease>>,
}

impl InMemoryLeaseRepository {
    /// An empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn row(key: &LeaseKey) -> (String, String) {
    (key.delivery_config.clone(), key.environment.clone())
}

impl EnvironmentLeaseRepository for InMemoryLeaseRepository {
    fn try_acquire(
        &self,
        key: &LeaseKey,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> anyhow::Result<LeaseAttempt> {
        let mut leases = lock(&self.leases, "lease")?;
        if let Some(existing) = leases.get(&row(key))
            && existing.is_live(now)
        {
            return Ok(LeaseAttempt::Held(existing.clone()));
        }

        let lease = Lease {
            key: key.clone(),
            lease_id: Uuid::new_v4().to_string(),
            acquired_at: now,
            expires_at: now.checked_add_signed(duration).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        leases.insert(row(key), lease.clone());
        Ok(LeaseAttempt::Granted(lease))
    }

    fn release(&self, lease: &Lease) -> anyhow::Result<()> {
        let key = row(&lease.key);
        let mut leases = lock(&self.leases, "lease")?;
        let owned = leases.get(&key).is_some_and(|held| held.lease_id == lease.lease_id);
        if owned {
            leases.remove(&key);
        }
        drop(leases);
        if !owned {
            log::debug!("Lease {} was already taken over, not releasing", lease.key);
        }
        Ok(())
    }

    fn current(&self, key: &LeaseKey, now: DateTime<Utc>) -> anyhow::Result<Option<Lease>> {
        Ok(lock(&self.leases, "lease")?
            .get(&row(key))
            .filter(|lease| lease.is_live(now))
            .cloned())
    }
}
