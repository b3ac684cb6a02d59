//! Evaluator registry
//!
//! Maps verification types to the evaluators that implement them.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::ports::VerificationEvaluator;
use crate::error::RunnerError;

/// Evaluators keyed by the verification type they support
#[derive(Default, Clone)]
pub struct EvaluatorRegistry {
    evaluators: BTreeMap<String, Arc<dyn VerificationEvaluator>>,
}

impl std::fmt::Debug for EvaluatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluatorRegistry")
            .field("types", &self.evaluators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EvaluatorRegistry {
    /// An empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an evaluator under its supported type
    ///
    /// A later registration for the same type replaces the earlier one.
    pub fn register(&mut self, evaluator: Arc<dyn VerificationEvaluator>) {
        let kind = evaluator.supported_type().to_string();
        if self.evaluators.insert(kind.clone(), evaluator).is_some() {
            log::warn!("Replacing evaluator for verification type {kind}");
        }
    }

    /// Builder-style: register an evaluator
    #[must_use]
    pub fn with(mut self, evaluator: Arc<dyn VerificationEvaluator>) -> Self {
        self.register(evaluator);
        self
    }

    /// The evaluator for a verification type
    pub fn evaluator_for(&self, kind: &str) -> Result<&dyn VerificationEvaluator, RunnerError> {
        match self.evaluators.get(kind) {
            Some(evaluator) => Ok(evaluator.as_ref()),
            None => Err(RunnerError::NoEvaluator {
                kind: kind.to_string(),
            }),
        }
    }

    /// Whether a verification type is supported
    #[must_use]
    pub fn supports(&self, kind: &str) -> bool {
        self.evaluators.contains_key(kind)
    }
}
