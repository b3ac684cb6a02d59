//! In-memory unhappy veto repository

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::lock;
use crate::core::models::Recheck;
use crate::core::ports::UnhappyVetoRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
struct VetoRecord {
    application: String,
    recheck: Recheck,
}

/// Veto records keyed by resource id
#[derive(Debug, Default)]
pub struct InMemoryUnhappyVetoRepository {
    records: Mutex<BTreeMap<String, VetoRecord>>,
}

impl InMemoryUnhappyVetoRepository {
    /// An empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UnhappyVetoRepository for InMemoryUnhappyVetoRepository {
    fn mark_unhappy(
        &self,
        resource_id: &str,
        application: &str,
        recheck: Recheck,
    ) -> anyhow::Result<()> {
        lock(&self.records, "unhappy veto")?.insert(
            resource_id.to_string(),
            VetoRecord {
                application: application.to_string(),
                recheck,
            },
        );
        Ok(())
    }

    fn get_recheck(&self, resource_id: &str) -> anyhow::Result<Option<Recheck>> {
        Ok(lock(&self.records, "unhappy veto")?.get(resource_id).map(|r| r.recheck))
    }

    fn delete(&self, resource_id: &str) -> anyhow::Result<()> {
        lock(&self.records, "unhappy veto")?.remove(resource_id);
        Ok(())
    }

    fn get_all(&self) -> anyhow::Result<Vec<String>> {
        Ok(lock(&self.records, "unhappy veto")?.keys().cloned().collect())
    }

    fn get_all_for_app(&self, application: &str) -> anyhow::Result<Vec<String>> {
        Ok(lock(&self.records, "unhappy veto")?
            .iter()
            .filter(|(_, record)| record.application == application)
            .map(|(id, _)| id.clone())
            .collect())
    }

    fn number_of_rejections(&self) -> anyhow::Result<usize> {
        Ok(lock(&self.records, "unhappy veto")?.len())
    }
}
