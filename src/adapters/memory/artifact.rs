//! In-memory artifact repository

use std::collections::BTreeSet;
use std::sync::Mutex;

use super::lock;
use crate::core::ports::ArtifactRepository;

/// Tracks which environments are currently being deployed to
#[derive(Debug, Default)]
pub struct InMemoryArtifactRepository {
    deploying: Mutex<BTreeSet<(String, String)>>,
}

impl InMemoryArtifactRepository {
    /// An empty repository; nothing is deploying
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a deployment to the environment started
    pub fn mark_deploying(&self, delivery_config: &str, environment: &str) -> anyhow::Result<()> {
        lock(&self.deploying, "artifact")?
            .insert((delivery_config.to_string(), environment.to_string()));
        Ok(())
    }

    /// Record that the deployment to the environment finished
    pub fn mark_deployed(&self, delivery_config: &str, environment: &str) -> anyhow::Result<()> {
        lock(&self.deploying, "artifact")?
            .remove(&(delivery_config.to_string(), environment.to_string()));
        Ok(())
    }
}

impl ArtifactRepository for InMemoryArtifactRepository {
    fn is_deploying_to(&self, delivery_config: &str, environment: &str) -> anyhow::Result<bool> {
        Ok(lock(&self.deploying, "artifact")?
            .contains(&(delivery_config.to_string(), environment.to_string())))
    }
}
