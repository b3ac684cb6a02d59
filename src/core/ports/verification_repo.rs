//! Verification repository port
//!
//! Durable state per (context, verification). Absence of a state means the
//! verification has not been started for that artifact version.

use std::collections::HashMap;

use crate::core::models::{
    ActionState, Metadata, Verification, VerificationContext, VerificationStatus,
};

/// Storage for verification states
#[cfg_attr(test, mockall::automock)]
pub trait VerificationRepository: Send + Sync {
    /// Latest state of one verification
    fn get_state(
        &self,
        context: &VerificationContext,
        verification: &Verification,
    ) -> anyhow::Result<Option<ActionState>>;

    /// States of all verifications recorded for the context, keyed by verification id
    fn get_states(
        &self,
        context: &VerificationContext,
    ) -> anyhow::Result<HashMap<String, ActionState>>;

    /// Insert or update a state
    ///
    /// Metadata is merged into existing metadata. Terminal statuses record an
    /// end time.
    fn update_state(
        &self,
        context: &VerificationContext,
        verification: &Verification,
        status: VerificationStatus,
        metadata: Metadata,
        link: Option<String>,
    ) -> anyhow::Result<()>;

    /// Compare-and-set: move a verification from `expected` to `status`
    ///
    /// `expected == None` means "no state recorded yet". Returns `false`
    /// without writing anything if the stored status differs from `expected`,
    /// so duplicate ticks of the scheduler never apply the same transition twice.
    fn transition_state(
        &self,
        context: &VerificationContext,
        verification: &Verification,
        expected: Option<VerificationStatus>,
        status: VerificationStatus,
        metadata: Metadata,
        link: Option<String>,
    ) -> anyhow::Result<bool>;

    /// Reset a verification to `NOT_EVALUATED` so it is run again
    ///
    /// Only an existing state is reset; a verification that was never started
    /// is left without one. The reset state starts over: metadata is replaced
    /// by the requesting user, the link and end time are cleared and the start
    /// time is restamped.
    fn reset_state(
        &self,
        context: &VerificationContext,
        verification: &Verification,
        user: &str,
    ) -> anyhow::Result<VerificationStatus>;

    /// Move every `PENDING` state of a verification in the environment to `status`
    ///
    /// States in any other status are left alone. Returns how many were moved.
    fn override_pending(
        &self,
        delivery_config: &str,
        environment: &str,
        verification_id: &str,
        status: VerificationStatus,
    ) -> anyhow::Result<usize>;

    /// Contexts in the environment with at least one verification in `status`
    fn contexts_with_status(
        &self,
        delivery_config: &str,
        environment: &str,
        status: VerificationStatus,
    ) -> anyhow::Result<Vec<VerificationContext>>;
}
