//! Verification evaluator port
//!
//! Evaluators know how to launch and assess one verification type
//! (e.g. a test container). The runner selects them by [`Verification::kind`].

use crate::core::models::{ActionState, Metadata, Verification, VerificationContext};

/// A pluggable verification strategy
#[cfg_attr(test, mockall::automock)]
pub trait VerificationEvaluator: Send + Sync {
    /// The verification type this evaluator handles
    fn supported_type(&self) -> &'static str;

    /// Launch the verification
    ///
    /// Returns metadata that is persisted with the `RUNNING` state and handed
    /// back to [`evaluate`](Self::evaluate).
    fn start(
        &self,
        context: &VerificationContext,
        verification: &Verification,
    ) -> anyhow::Result<Metadata>;

    /// Assess a running verification
    ///
    /// Returning a non-terminal status means "still running".
    fn evaluate(
        &self,
        context: &VerificationContext,
        verification: &Verification,
        old_state: &ActionState,
    ) -> anyhow::Result<ActionState>;
}
