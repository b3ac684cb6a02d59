//! Diff fingerprint repository port

/// Counts remediation actions against a resource's current diff
///
/// The count resets to zero whenever the diff fingerprint changes; that
/// bookkeeping is owned by the implementation.
#[cfg_attr(test, mockall::automock)]
pub trait DiffFingerprintRepository: Send + Sync {
    /// Number of actions taken against the current diff of the resource
    fn action_taken_count(&self, resource_id: &str) -> anyhow::Result<u32>;

    /// Forget the diff fingerprint of the resource
    fn clear(&self, resource_id: &str) -> anyhow::Result<()>;
}
