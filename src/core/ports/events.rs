//! Event publisher port

use crate::core::models::VerificationEvent;

/// Sink for verification lifecycle events
#[cfg_attr(test, mockall::automock)]
pub trait EventPublisher: Send + Sync {
    /// Publish an event; delivery failures are the publisher's concern
    fn publish(&self, event: VerificationEvent);
}
