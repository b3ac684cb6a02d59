//! In-memory diff fingerprint repository

use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;
use crate::core::ports::DiffFingerprintRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    hash: String,
    actions_taken: u32,
}

/// Diff fingerprints and the number of actions taken against each
///
/// Recording a different hash for a resource resets its action count.
#[derive(Debug, Default)]
pub struct InMemoryDiffFingerprintRepository {
    fingerprints: Mutex<HashMap<String, Fingerprint>>,
}

impl InMemoryDiffFingerprintRepository {
    /// An empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current diff of a resource
    pub fn store(&self, resource_id: &str, hash: &str) -> anyhow::Result<()> {
        let mut fingerprints = lock(&self.fingerprints, "diff fingerprint")?;
        let unchanged = fingerprints.get(resource_id).is_some_and(|f| f.hash == hash);
        if !unchanged {
            fingerprints.insert(
                resource_id.to_string(),
                Fingerprint {
                    hash: hash.to_string(),
                    actions_taken: 0,
                },
            );
        }
        Ok(())
    }

    /// Count one remediation action against the current diff
    pub fn mark_action_taken(&self, resource_id: &str) -> anyhow::Result<()> {
        let mut fingerprints = lock(&self.fingerprints, "diff fingerprint")?;
        match fingerprints.get_mut(resource_id) {
            Some(fingerprint) => {
                fingerprint.actions_taken = fingerprint.actions_taken.saturating_add(1);
                Ok(())
            },
            None => anyhow::bail!("no diff fingerprint recorded for {resource_id}"),
        }
    }
}

impl DiffFingerprintRepository for InMemoryDiffFingerprintRepository {
    fn action_taken_count(&self, resource_id: &str) -> anyhow::Result<u32> {
        Ok(lock(&self.fingerprints, "diff fingerprint")?
            .get(resource_id)
            .map_or(0, |f| f.actions_taken))
    }

    fn clear(&self, resource_id: &str) -> anyhow::Result<()> {
        lock(&self.fingerprints, "diff fingerprint")?.remove(resource_id);
        Ok(())
    }
}
