//! Verification definitions
//!
//! A verification describes *what* to check after a deployment. The `kind`
//! selects the evaluator; everything else is evaluator-specific payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Type name of the built-in test container verification
pub const TEST_CONTAINER_TYPE: &str = "test-container";

/// A configured post-deployment check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    /// Verification type, used to look up the evaluator
    #[serde(rename = "type")]
    pub kind: String,
    /// Identifier, unique within an environment
    pub id: String,
    /// Type-specific payload
    #[serde(default, flatten)]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl Verification {
    /// Create a verification with no payload
    #[must_use]
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            params: BTreeMap::new(),
        }
    }

    /// A test container verification, identified as `image:tag`
    #[must_use]
    pub fn test_container(image: &str, tag: &str, location: Option<&str>) -> Self {
        let mut verification = Self::new(TEST_CONTAINER_TYPE, format!("{image}:{tag}"))
            .with_param("image", image)
            .with_param("tag", tag);
        if let Some(location) = location {
            verification = verification.with_param("location", location);
        }
        verification
    }

    /// Builder-style: set a payload entry
    #[must_use]
    pub fn with_param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Read a string payload entry
    #[must_use]
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(serde_json::Value::as_str)
    }
}

impl std::fmt::Display for Verification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}
