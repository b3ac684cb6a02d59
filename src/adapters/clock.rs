//! Wall clock

use chrono::{DateTime, Utc};

use crate::core::ports::Clock;

/// The system's UTC clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
