//! Per-index action outcomes.

use super::index::DeviceIndex;
use super::namespace::Namespace;
use crate::error::InstanceError;

/// Outcome of one action against one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(InstanceError),
}

/// Result recorded for one entry of the request's index list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub index: DeviceIndex,
    /// Namespace the action ran under; `None` when config resolution failed.
    pub namespace: Option<Namespace>,
    pub outcome: Outcome,
}

impl ActionResult {
    pub fn success(index: DeviceIndex, namespace: Namespace) -> Self {
        Self {
            index,
            namespace: Some(namespace),
            outcome: Outcome::Success,
        }
    }

    pub fn failure(
        index: DeviceIndex,
        namespace: Option<Namespace>,
        error: impl Into<InstanceError>,
    ) -> Self {
        Self {
            index,
            namespace,
            outcome: Outcome::Failure(error.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success)
    }

    /// The failure cause, if any.
    #[must_use]
    pub fn error(&self) -> Option<&InstanceError> {
        match &self.outcome {
            Outcome::Success => None,
            Outcome::Failure(err) => Some(err),
        }
    }

    /// Human-readable detail: `"ok"` or the error message.
    #[must_use]
    pub fn detail(&self) -> String {
        match &self.outcome {
            Outcome::Success => "ok".to_string(),
            Outcome::Failure(err) => err.to_string(),
        }
    }
}
