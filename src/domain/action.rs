//! Lifecycle actions and the request that carries them.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::index::DeviceIndex;
use crate::error::DispatchError;

/// Lifecycle action applied to each selected instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Create and start the instance group.
    Up,
    /// Stop and remove the instance group.
    Down,
    /// Restart the instance group.
    Restart,
    /// Tail the instance group's logs until interrupted.
    Logs,
    /// Stop the instance group without removing it.
    Stop,
}

impl Action {
    /// Every accepted action, in help-text order.
    pub const ALL: [Action; 5] = [
        Action::Up,
        Action::Down,
        Action::Restart,
        Action::Logs,
        Action::Stop,
    ];

    /// Lowercase name used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Restart => "restart",
            Action::Logs => "logs",
            Action::Stop => "stop",
        }
    }

    /// Whether this action blocks on a log stream instead of completing.
    #[must_use]
    pub const fn is_streaming(self) -> bool {
        matches!(self, Action::Logs)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| DispatchError::UnknownAction(s.to_string()))
    }
}

/// Role within an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRole {
    /// The long-running compute backend.
    Compute,
    /// The companion worker.
    Worker,
}

impl ServiceRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ServiceRole::Compute => "compute",
            ServiceRole::Worker => "worker",
        }
    }
}

/// Which roles an action applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetService {
    Compute,
    Worker,
    #[default]
    Both,
}

impl TargetService {
    /// Accepted service names on the command line.
    pub const NAMES: [&'static str; 3] = ["compute", "worker", "both"];

    /// Resolve an optional operator-supplied name. `None` means both roles.
    pub fn parse(name: Option<&str>) -> Result<Self, DispatchError> {
        match name {
            None => Ok(TargetService::Both),
            Some("compute") => Ok(TargetService::Compute),
            Some("worker") => Ok(TargetService::Worker),
            Some("both") => Ok(TargetService::Both),
            Some(other) => Err(DispatchError::InvalidServiceName(other.to_string())),
        }
    }

    /// Roles covered by this target, compute first.
    #[must_use]
    pub fn roles(self) -> &'static [ServiceRole] {
        match self {
            TargetService::Compute => &[ServiceRole::Compute],
            TargetService::Worker => &[ServiceRole::Worker],
            TargetService::Both => &[ServiceRole::Compute, ServiceRole::Worker],
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TargetService::Compute => "compute",
            TargetService::Worker => "worker",
            TargetService::Both => "both",
        }
    }
}

impl fmt::Display for TargetService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as typed by the operator, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: String,
    pub service: Option<String>,
    pub indices: Vec<DeviceIndex>,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>, indices: Vec<DeviceIndex>) -> Self {
        Self {
            action: action.into(),
            service: None,
            indices,
        }
    }

    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_round_trips_through_its_name() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>(), Ok(action));
        }
    }

    #[test]
    fn unknown_action_is_rejected_verbatim() {
        assert_eq!(
            "start".parse::<Action>(),
            Err(DispatchError::UnknownAction("start".into()))
        );
        assert_eq!(
            "UP".parse::<Action>(),
            Err(DispatchError::UnknownAction("UP".into()))
        );
    }

    #[test]
    fn unset_service_means_both() {
        assert_eq!(TargetService::parse(None), Ok(TargetService::Both));
        assert_eq!(TargetService::Both.roles().len(), 2);
    }

    #[test]
    fn unknown_service_is_rejected() {
        assert_eq!(
            TargetService::parse(Some("miner")),
            Err(DispatchError::InvalidServiceName("miner".into()))
        );
    }

    #[test]
    fn only_logs_streams() {
        let streaming: Vec<_> = Action::ALL.into_iter().filter(|a| a.is_streaming()).collect();
        assert_eq!(streaming, vec![Action::Logs]);
    }
}
