//! Aggregation of per-index results into an overall status.

use std::fmt;

use serde::Serialize;

use crate::domain::{ActionResult, DeviceIndex, Namespace};
use crate::error::DispatchError;

/// Overall status of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

/// One diagnostic line, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticLine {
    /// `None` only for the request-level `NoIndices` line.
    pub index: Option<DeviceIndex>,
    pub namespace: Option<Namespace>,
    pub success: bool,
    pub detail: String,
}

impl fmt::Display for DiagnosticLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.index, self.success) {
            (Some(index), true) => write!(f, "device {index}: ok"),
            (Some(index), false) => write!(f, "device {index}: failed: {}", self.detail),
            (None, _) => f.write_str(&self.detail),
        }
    }
}

impl From<&ActionResult> for DiagnosticLine {
    fn from(result: &ActionResult) -> Self {
        Self {
            index: Some(result.index.clone()),
            namespace: result.namespace.clone(),
            success: result.is_success(),
            detail: result.detail(),
        }
    }
}

/// Aggregate status plus diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub status: Status,
    pub lines: Vec<DiagnosticLine>,
}

impl Report {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Indices whose action failed, in execution order (duplicates kept).
    #[must_use]
    pub fn failed_indices(&self) -> Vec<&DeviceIndex> {
        self.lines
            .iter()
            .filter(|line| !line.success)
            .filter_map(|line| line.index.as_ref())
            .collect()
    }
}

/// Fold results into a [`Report`].
///
/// Success requires a non-empty input where every element succeeded; an
/// empty input is a `NoIndices` failure, never a vacuous success.
#[must_use]
pub fn aggregate(results: &[ActionResult]) -> Report {
    if results.is_empty() {
        return Report {
            status: Status::Failure,
            lines: vec![DiagnosticLine {
                index: None,
                namespace: None,
                success: false,
                detail: DispatchError::NoIndices.to_string(),
            }],
        };
    }

    let lines: Vec<DiagnosticLine> = results.iter().map(DiagnosticLine::from).collect();

    let status = if lines.iter().all(|line| line.success) {
        Status::Success
    } else {
        Status::Failure
    };

    Report { status, lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_PREFIX;
    use crate::error::{ConfigError, RuntimeError};

    fn index(raw: &str) -> DeviceIndex {
        DeviceIndex::new(raw).expect("index")
    }

    fn ok(raw: &str) -> ActionResult {
        let index = index(raw);
        let namespace = Namespace::derive(DEFAULT_PREFIX, &index);
        ActionResult::success(index, namespace)
    }

    #[test]
    fn empty_input_is_no_indices_failure() {
        let report = aggregate(&[]);
        assert_eq!(report.status, Status::Failure);
        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].detail, "no device indices given");
    }

    #[test]
    fn all_success_is_success() {
        let report = aggregate(&[ok("0"), ok("1")]);
        assert!(report.is_success());
        assert!(report.failed_indices().is_empty());
    }

    #[test]
    fn one_failure_fails_the_whole_report_and_is_named() {
        let results = vec![
            ok("2"),
            ActionResult::failure(index("3"), None, ConfigError::missing("ERC20_ADDRESS_3")),
            ok("4"),
        ];

        let report = aggregate(&results);
        assert_eq!(report.status, Status::Failure);
        assert_eq!(report.failed_indices(), vec![&index("3")]);
        assert_eq!(report.lines[0].to_string(), "device 2: ok");
        assert_eq!(
            report.lines[1].to_string(),
            "device 3: failed: missing required field: ERC20_ADDRESS_3"
        );
    }

    #[test]
    fn lines_follow_execution_order_with_duplicates() {
        let failed = ActionResult::failure(
            index("1"),
            Some(Namespace::derive(DEFAULT_PREFIX, &index("1"))),
            RuntimeError::NotFound("instance-1".into()),
        );
        let report = aggregate(&[ok("1"), failed, ok("0")]);

        let order: Vec<_> = report
            .lines
            .iter()
            .map(|line| (line.index.as_ref().map(DeviceIndex::as_str), line.success))
            .collect();
        assert_eq!(
            order,
            vec![(Some("1"), true), (Some("1"), false), (Some("0"), true)]
        );
    }
}
