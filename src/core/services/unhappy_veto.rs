//! Unhappy veto
//!
//! Decides whether a resource that keeps diffing after remediation may be
//! acted on again. Consulted once per reconciliation attempt; independent of
//! the exclusion enforcer and free of leases. Two concurrent checks for the
//! same resource may both be allowed, which is harmless because remediation
//! is idempotent.
//!
//! Per resource, with `n` = actions taken against the current diff:
//!
//! | `n`                         | record             | verdict                          |
//! |-----------------------------|--------------------|----------------------------------|
//! | `0`                         | any                | allow, record deleted            |
//! | `1..=max_retries`           | any                | allow                            |
//! | above `max_retries`         | none               | deny, recheck armed              |
//! | above `max_retries`         | recheck in future  | deny, same recheck               |
//! | above `max_retries`         | recheck passed     | allow once, recheck re-armed     |
//! | at least `give_up_after`    | any                | deny, recheck cleared (forever)  |

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::core::models::{Recheck, Resource, VetoResponse};
use crate::core::ports::{Clock, ConfigProvider, DiffFingerprintRepository, UnhappyVetoRepository};

/// Name reported in veto responses
pub const UNHAPPY_VETO_NAME: &str = "UnhappyVeto";

/// Per-resource backoff for remediation that does not stick
pub struct UnhappyVeto {
    diff_fingerprints: Arc<dyn DiffFingerprintRepository>,
    vetoes: Arc<dyn UnhappyVetoRepository>,
    config: Arc<dyn ConfigProvider>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for UnhappyVeto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnhappyVeto")
            .field("max_retries", &self.config.max_retries())
            .field("time_between_retries", &self.config.time_between_retries())
            .finish_non_exhaustive()
    }
}

impl UnhappyVeto {
    /// Create the veto
    #[must_use]
    pub const fn new(
        diff_fingerprints: Arc<dyn DiffFingerprintRepository>,
        vetoes: Arc<dyn UnhappyVetoRepository>,
        config: Arc<dyn ConfigProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            diff_fingerprints,
            vetoes,
            config,
            clock,
        }
    }

    /// Should we attempt to fix this resource's diff right now?
    pub fn check(&self, resource: &Resource) -> anyhow::Result<VetoResponse> {
        let actions_taken = self.diff_fingerprints.action_taken_count(&resource.id)?;
        let max_retries = self.config.max_retries();

        if actions_taken == 0 {
            self.vetoes.delete(&resource.id)?;
            return Ok(VetoResponse::allow(UNHAPPY_VETO_NAME));
        }

        if let Some(give_up_after) = self.config.give_up_after()
            && actions_taken >= give_up_after
        {
            if self.vetoes.get_recheck(&resource.id)? != Some(Recheck::Never) {
                log::info!(
                    "Giving up on {} after {actions_taken} unsuccessful actions",
                    resource.id
                );
                self.vetoes.mark_unhappy(&resource.id, &resource.application, Recheck::Never)?;
            }
            return Ok(VetoResponse::deny(
                UNHAPPY_VETO_NAME,
                format!(
                    "Resource is unhappy and our {actions_taken} actions have not fixed it. \
                     We will not try again until the diff changes or the veto is cleared."
                ),
                None,
            ));
        }

        if actions_taken <= max_retries {
            return Ok(VetoResponse::allow(UNHAPPY_VETO_NAME));
        }

        let now = self.clock.now();
        let wait = self.config.time_between_retries();
        match self.vetoes.get_recheck(&resource.id)? {
            Some(Recheck::At(recheck_time)) if recheck_time > now => {
                log::debug!("{} is unhappy, next recheck at {recheck_time}", resource.id);
                Ok(cooling_down(actions_taken, recheck_time, now))
            },
            Some(Recheck::At(_)) => {
                let recheck_time = rearm(now, wait);
                log::info!(
                    "Allowing a recheck of unhappy resource {}, next one at {recheck_time}",
                    resource.id
                );
                self.vetoes.mark_unhappy(
                    &resource.id,
                    &resource.application,
                    Recheck::At(recheck_time),
                )?;
                Ok(VetoResponse::allow(UNHAPPY_VETO_NAME))
            },
            Some(Recheck::Never) | None => {
                let recheck_time = rearm(now, wait);
                log::info!(
                    "Resource {} is unhappy after {actions_taken} actions, rechecking at {recheck_time}",
                    resource.id
                );
                self.vetoes.mark_unhappy(
                    &resource.id,
                    &resource.application,
                    Recheck::At(recheck_time),
                )?;
                Ok(cooling_down(actions_taken, recheck_time, now))
            },
        }
    }

    /// Manually lift the veto of a resource and forget its diff
    pub fn clear(&self, resource_id: &str) -> anyhow::Result<()> {
        log::info!("Clearing unhappy veto for {resource_id}");
        self.vetoes.delete(resource_id)?;
        self.diff_fingerprints.clear(resource_id)
    }

    /// All currently vetoed resource ids
    pub fn current_rejections(&self) -> anyhow::Result<Vec<String>> {
        self.vetoes.get_all()
    }

    /// Currently vetoed resource ids of one application
    pub fn current_rejections_by_app(&self, application: &str) -> anyhow::Result<Vec<String>> {
        self.vetoes.get_all_for_app(application)
    }

    /// Gauge: number of currently vetoed resources
    pub fn rejection_count(&self) -> anyhow::Result<usize> {
        let count = self.vetoes.number_of_rejections()?;
        log::debug!("{count} resource(s) currently vetoed as unhappy");
        Ok(count)
    }
}

fn cooling_down(actions_taken: u32, recheck_time: DateTime<Utc>, now: DateTime<Utc>) -> VetoResponse {
    let minutes = minutes_until(recheck_time, now);
    VetoResponse::deny(
        UNHAPPY_VETO_NAME,
        format!(
            "Resource is unhappy and our {actions_taken} actions have not fixed it. \
             We will try again in {minutes} minute{}, or if the diff changes.",
            if minutes == 1 { "" } else { "s" }
        ),
        Some(recheck_time),
    )
}

fn rearm(now: DateTime<Utc>, wait: Duration) -> DateTime<Utc> {
    now.checked_add_signed(wait).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whole minutes until `recheck_time`, rounded up
fn minutes_until(recheck_time: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (recheck_time - now).num_seconds().max(0);
    (seconds + 59) / 60
}
