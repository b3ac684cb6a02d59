//! Persisted state of one verification against one artifact version

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::VerificationStatus;

/// Opaque evaluator-produced metadata (task ids, links, ...)
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// State record for a (context, verification) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionState {
    /// Current status
    pub status: VerificationStatus,
    /// When the verification was started
    pub started_at: DateTime<Utc>,
    /// When the verification reached a terminal status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Evaluator metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
    /// Link to the running check, if the evaluator provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ActionState {
    /// Copy of this state with a new status
    ///
    /// Terminal statuses get an end time.
    #[must_use]
    pub fn with_status(&self, status: VerificationStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            ended_at: status.is_complete().then_some(now),
            ..self.clone()
        }
    }

    /// Builder-style: set the link
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}
