//! Event publisher that writes verification events to the log
//!
//! Events are serialized as JSON on the `envguard::events` target so they can
//! be filtered and shipped separately from diagnostic output.

use crate::core::models::VerificationEvent;
use crate::core::ports::EventPublisher;

/// Log target used for published events
pub const EVENT_TARGET: &str = "envguard::events";

/// Publishes events as structured log lines
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventPublisher;

impl EventPublisher for LoggingEventPublisher {
    fn publish(&self, event: VerificationEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => log::info!(target: EVENT_TARGET, "{json}"),
            Err(e) => log::warn!(
                target: EVENT_TARGET,
                "Could not serialize event for {}: {e}",
                event.context().short_name()
            ),
        }
    }
}
