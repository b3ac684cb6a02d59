//! Artifact repository port

/// Read access to deployment progress
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactRepository: Send + Sync {
    /// Whether any artifact version is currently being deployed to the environment
    fn is_deploying_to(&self, delivery_config: &str, environment: &str) -> anyhow::Result<bool>;
}
