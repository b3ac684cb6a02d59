//! Hand-written implementations of port traits for testing
//!
//! These give tests control over time and evaluator outcomes while the
//! repositories stay real.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Duration, Utc};
use envguard::core::models::{
    ActionState, Metadata, Verification, VerificationContext, VerificationEvent,
    VerificationStatus,
};
use envguard::core::ports::{Clock, EventPublisher, VerificationEvaluator};

/// A clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Evaluator that replays a queue of statuses
///
/// Once the queue is empty every evaluation reports `RUNNING`.
pub struct ScriptedEvaluator {
    kind: &'static str,
    outcomes: Mutex<VecDeque<VerificationStatus>>,
    starts: AtomicUsize,
    evaluations: AtomicUsize,
    fail_starts: bool,
}

impl ScriptedEvaluator {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            outcomes: Mutex::new(VecDeque::new()),
            starts: AtomicUsize::new(0),
            evaluations: AtomicUsize::new(0),
            fail_starts: false,
        }
    }

    pub fn failing(kind: &'static str) -> Self {
        Self {
            fail_starts: true,
            ..Self::new(kind)
        }
    }

    pub fn then(self, status: VerificationStatus) -> Self {
        self.outcomes.lock().unwrap().push_back(status);
        self
    }

    pub fn push(&self, status: VerificationStatus) {
        self.outcomes.lock().unwrap().push_back(status);
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

impl VerificationEvaluator for ScriptedEvaluator {
    fn supported_type(&self) -> &'static str {
        self.kind
    }

    fn start(
        &self,
        _context: &VerificationContext,
        verification: &Verification,
    ) -> anyhow::Result<Metadata> {
        if self.fail_starts {
            anyhow::bail!("container scheduler rejected {}", verification.id);
        }
        let n = self.starts.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Metadata::from([("taskId".to_string(), format!("task-{n}").into())]))
    }

    fn evaluate(
        &self,
        _context: &VerificationContext,
        verification: &Verification,
        old_state: &ActionState,
    ) -> anyhow::Result<ActionState> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        let status = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(VerificationStatus::Running);
        Ok(old_state
            .with_status(status, Utc::now())
            .with_link(format!("https://ci.example.com/{}", verification.id)))
    }
}

/// Publisher that keeps every event
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<VerificationEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<VerificationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn started(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, VerificationEvent::Started { .. }))
            .count()
    }

    pub fn completed(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, VerificationEvent::Completed { .. }))
            .count()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: VerificationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
