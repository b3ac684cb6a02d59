//! Adapter implementations for port traits
//!
//! - `memory/` - mutex-guarded in-memory repositories
//! - `clock` - wall clock
//! - `log_events` - event publisher writing to the log

pub mod clock;
pub mod log_events;
pub mod memory;

pub use clock::SystemClock;
pub use log_events::LoggingEventPublisher;
