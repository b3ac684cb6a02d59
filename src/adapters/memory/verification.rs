//! In-memory verification repository

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use super::lock;
use crate::core::models::{
    ActionState, Metadata, Verification, VerificationContext, VerificationStatus,
};
use crate::core::ports::{Clock, VerificationRepository};

/// Metadata key recording who asked for a verification to be re-run
pub const RETRY_REQUESTED_BY: &str = "retryRequestedBy";

type StateKey = (VerificationContext, String);

/// Verification states keyed by context and verification id
pub struct InMemoryVerificationRepository {
    states: Mutex<BTreeMap<StateKey, ActionState>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for InMemoryVerificationRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVerificationRepository")
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}

impl InMemoryVerificationRepository {
    /// An empty repository stamping states with `clock`
    #[must_use]
    pub const fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            states: Mutex::new(BTreeMap::new()),
            clock,
        }
    }

    fn upsert(
        &self,
        states: &mut BTreeMap<StateKey, ActionState>,
        key: StateKey,
        status: VerificationStatus,
        metadata: Metadata,
        link: Option<String>,
    ) {
        let now = self.clock.now();
        let state = match states.remove(&key) {
            Some(mut existing) => {
                if status == VerificationStatus::Running && existing.status != status {
                    existing.started_at = now;
                }
                existing.metadata.extend(metadata);
                ActionState {
                    link,
                    ..existing.with_status(status, now)
                }
            },
            None => ActionState {
                status,
                started_at: now,
                ended_at: status.is_complete().then_some(now),
                metadata,
                link,
            },
        };
        states.insert(key, state);
    }
}

fn key(context: &VerificationContext, verification: &Verification) -> StateKey {
    (context.clone(), verification.id.clone())
}

impl VerificationRepository for InMemoryVerificationRepository {
    fn get_state(
        &self,
        context: &VerificationContext,
        verification: &Verification,
    ) -> anyhow::Result<Option<ActionState>> {
        Ok(lock(&self.states, "verification")?.get(&key(context, verification)).cloned())
    }

    fn get_states(
        &self,
        context: &VerificationContext,
    ) -> anyhow::Result<HashMap<String, ActionState>> {
        Ok(lock(&self.states, "verification")?
            .iter()
            .filter(|((ctx, _), _)| ctx == context)
            .map(|((_, id), state)| (id.clone(), state.clone()))
            .collect())
    }

    fn update_state(
        &self,
        context: &VerificationContext,
        verification: &Verification,
        status: VerificationStatus,
        metadata: Metadata,
        link: Option<String>,
    ) -> anyhow::Result<()> {
        let mut states = lock(&self.states, "verification")?;
        self.upsert(&mut states, key(context, verification), status, metadata, link);
        Ok(())
    }

    fn transition_state(
        &self,
        context: &VerificationContext,
        verification: &Verification,
        expected: Option<VerificationStatus>,
        status: VerificationStatus,
        metadata: Metadata,
        link: Option<String>,
    ) -> anyhow::Result<bool> {
        let mut states = lock(&self.states, "verification")?;
        let key = key(context, verification);
        let current = states.get(&key).map(|state| state.status);
        if current != expected {
            return Ok(false);
        }
        self.upsert(&mut states, key, status, metadata, link);
        Ok(true)
    }

    fn reset_state(
        &self,
        context: &VerificationContext,
        verification: &Verification,
        user: &str,
    ) -> anyhow::Result<VerificationStatus> {
        let now = self.clock.now();
        let mut states = lock(&self.states, "verification")?;
        if let Some(state) = states.get_mut(&key(context, verification)) {
            *state = ActionState {
                status: VerificationStatus::NotEvaluated,
                started_at: now,
                ended_at: None,
                metadata: Metadata::from([(
                    RETRY_REQUESTED_BY.to_string(),
                    serde_json::Value::from(user),
                )]),
                link: None,
            };
        }
        Ok(VerificationStatus::NotEvaluated)
    }

    fn override_pending(
        &self,
        delivery_config: &str,
        environment: &str,
        verification_id: &str,
        status: VerificationStatus,
    ) -> anyhow::Result<usize> {
        let now = self.clock.now();
        let mut states = lock(&self.states, "verification")?;
        let mut overridden = 0;
        for ((ctx, id), state) in &mut *states {
            if id == verification_id
                && ctx.is_in(delivery_config, environment)
                && state.status == VerificationStatus::Pending
            {
                *state = state.with_status(status, now);
                overridden += 1;
            }
        }
        Ok(overridden)
    }

    fn contexts_with_status(
        &self,
        delivery_config: &str,
        environment: &str,
        status: VerificationStatus,
    ) -> anyhow::Result<Vec<VerificationContext>> {
        let mut contexts: Vec<VerificationContext> = lock(&self.states, "verification")?
            .iter()
            .filter(|((ctx, _), state)| {
                state.status == status && ctx.is_in(delivery_config, environment)
            })
            .map(|((ctx, _), _)| ctx.clone())
            .collect();
        contexts.dedup();
        Ok(contexts)
    }
}
