use std::time::Duration;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required field: {key}")]
    MissingField { key: String },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("failed to read {path}: {reason}")]
    ReadFile { path: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl ConfigError {
    pub(crate) fn missing(key: impl Into<String>) -> Self {
        Self::MissingField { key: key.into() }
    }

    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Failures reported by the container runtime for one namespace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("failed to create instance: {0}")]
    CreateFailed(String),

    #[error("instance {0} not found")]
    NotFound(String),

    #[error("instance {0} is already running")]
    AlreadyRunning(String),

    #[error("runtime call timed out after {0:?}")]
    Timeout(Duration),

    #[error("runtime error: {0}")]
    Other(String),
}

/// Pre-flight validation failures. These abort the whole request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("invalid service name '{0}'")]
    InvalidServiceName(String),

    #[error("no device indices given")]
    NoIndices,
}

/// Per-index failure recorded in an action result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Failures of the host-level steps: loading settings and running setup.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
