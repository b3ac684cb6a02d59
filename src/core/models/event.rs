//! Verification lifecycle events

use serde::{Deserialize, Serialize};

use super::{Metadata, Verification, VerificationContext, VerificationStatus};

/// Emitted by the verification runner on state transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VerificationEvent {
    /// An evaluator launched a verification
    Started {
        /// Where the verification runs
        context: VerificationContext,
        /// What was started
        verification: Verification,
        /// Metadata returned by the evaluator
        metadata: Metadata,
    },
    /// A running verification reached a terminal status
    Completed {
        /// Where the verification ran
        context: VerificationContext,
        /// What completed
        verification: Verification,
        /// Status before evaluation
        old_status: VerificationStatus,
        /// Terminal status
        new_status: VerificationStatus,
        /// Metadata after evaluation
        metadata: Metadata,
    },
}

impl VerificationEvent {
    /// The context the event belongs to
    #[must_use]
    pub const fn context(&self) -> &VerificationContext {
        match self {
            Self::Started { context, .. } | Self::Completed { context, .. } => context,
        }
    }

    /// The verification the event is about
    #[must_use]
    pub const fn verification(&self) -> &Verification {
        match self {
            Self::Started { verification, .. } | Self::Completed { verification, .. } => {
                verification
            },
        }
    }
}
