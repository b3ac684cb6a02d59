//! Runtime configuration port
//!
//! Values are read at the top of every call so operators can flip them
//! without restarting the process.

use chrono::Duration;

/// Dynamic settings consulted by the services
#[cfg_attr(test, mockall::automock)]
pub trait ConfigProvider: Send + Sync {
    /// Whether deployment/verification exclusion is enforced
    fn enforcement_enabled(&self) -> bool;

    /// How long an environment lease stays live without being released
    fn lease_duration(&self) -> Duration;

    /// Number of remediation actions tolerated before the unhappy veto kicks in
    fn max_retries(&self) -> u32;

    /// Cool-down between rechecks of an unhappy resource
    fn time_between_retries(&self) -> Duration;

    /// Action count at which the unhappy veto stops rechecking altogether
    fn give_up_after(&self) -> Option<u32>;
}
