//! Resources subject to the unhappy veto

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The parts of a managed resource the veto policy needs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    /// Resource id, e.g. `ec2:cluster:prod:ap-south-1:fnord-main`
    pub id: String,
    /// Owning application
    pub application: String,
}

impl Resource {
    /// Create a new resource reference
    #[must_use]
    pub fn new(id: impl Into<String>, application: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            application: application.into(),
        }
    }
}

/// When a vetoed resource may next be acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recheck {
    /// Cooling down until this instant
    At(DateTime<Utc>),
    /// Given up until the diff changes or the veto is cleared
    Never,
}

impl Recheck {
    /// The recheck instant, if one is scheduled
    #[must_use]
    pub const fn time(self) -> Option<DateTime<Utc>> {
        match self {
            Self::At(time) => Some(time),
            Self::Never => None,
        }
    }
}

/// Outcome of a veto check
///
/// A denial is a normal answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VetoResponse {
    /// Whether the action may proceed
    pub allowed: bool,
    /// Name of the veto that produced this response
    pub veto_name: String,
    /// Explanation for a denial
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the resource will next be rechecked; `None` on a denial means never
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recheck_time: Option<DateTime<Utc>>,
}

impl VetoResponse {
    /// The action may proceed
    #[must_use]
    pub fn allow(veto_name: &str) -> Self {
        Self {
            allowed: true,
            veto_name: veto_name.to_string(),
            message: None,
            recheck_time: None,
        }
    }

    /// The action may not proceed
    #[must_use]
    pub fn deny(
        veto_name: &str,
        message: impl Into<String>,
        recheck_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            allowed: false,
            veto_name: veto_name.to_string(),
            message: Some(message.into()),
            recheck_time,
        }
    }
}
