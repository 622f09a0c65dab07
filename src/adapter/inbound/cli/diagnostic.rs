//! Miette-based diagnostics for request-level failures.

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::{Action, TargetService};
use crate::error::DispatchError;

/// The request itself was malformed; nothing was run.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(gpufleet::invocation))]
pub struct InvocationError {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

impl InvocationError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl From<&DispatchError> for InvocationError {
    fn from(err: &DispatchError) -> Self {
        let error = Self::new(err.to_string());
        match err {
            DispatchError::UnknownAction(_) => {
                let names: Vec<_> = Action::ALL.iter().map(|a| a.as_str()).collect();
                error.with_help(format!("expected one of: {}", names.join(", ")))
            }
            DispatchError::InvalidServiceName(_) => error.with_help(format!(
                "expected one of: {}",
                TargetService::NAMES.join(", ")
            )),
            DispatchError::NoIndices => {
                error.with_help("pass a comma-separated list such as `0,1`")
            }
        }
    }
}

/// Settings, env file, or host tooling problem.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(gpufleet::environment))]
pub struct EnvironmentError {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

impl EnvironmentError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Render a diagnostic to stderr using the installed miette handler.
pub fn report(diagnostic: impl Diagnostic + Send + Sync + 'static) {
    if super::output::is_json() {
        super::output::error(&diagnostic.to_string());
        return;
    }
    eprintln!("{:?}", miette::Report::new(diagnostic));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_lists_accepted_actions() {
        let err = InvocationError::from(&DispatchError::UnknownAction("launch".into()));
        assert_eq!(err.message, "unknown action 'launch'");
        assert_eq!(
            err.help.as_deref(),
            Some("expected one of: up, down, restart, logs, stop")
        );
    }

    #[test]
    fn invalid_service_lists_names() {
        let err = InvocationError::from(&DispatchError::InvalidServiceName("gpu".into()));
        let help = err.help.unwrap_or_default();
        assert!(help.contains("compute"));
        assert!(help.contains("both"));
    }
}
