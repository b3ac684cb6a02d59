//! Unhappy veto repository port

use crate::core::models::Recheck;

/// Storage for per-resource unhappy veto records
///
/// A missing record means the resource is not vetoed.
#[cfg_attr(test, mockall::automock)]
pub trait UnhappyVetoRepository: Send + Sync {
    /// Create or replace the veto record of a resource
    fn mark_unhappy(
        &self,
        resource_id: &str,
        application: &str,
        recheck: Recheck,
    ) -> anyhow::Result<()>;

    /// The recheck of the resource's veto record, `None` if there is no record
    fn get_recheck(&self, resource_id: &str) -> anyhow::Result<Option<Recheck>>;

    /// Remove the veto record, if any
    fn delete(&self, resource_id: &str) -> anyhow::Result<()>;

    /// All vetoed resource ids
    fn get_all(&self) -> anyhow::Result<Vec<String>>;

    /// Vetoed resource ids of one application
    fn get_all_for_app(&self, application: &str) -> anyhow::Result<Vec<String>>;

    /// Number of vetoed resources
    fn number_of_rejections(&self) -> anyhow::Result<usize>;
}
