//! In-memory runtime adapter for dispatcher tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};

use crate::domain::{InstanceConfig, Namespace, TargetService};
use crate::error::RuntimeError;
use crate::port::{LogStream, RuntimeAdapter};

/// One adapter invocation, as observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    Start {
        namespace: String,
        target: TargetService,
        config: InstanceConfig,
    },
    Stop {
        namespace: String,
        target: TargetService,
    },
    Destroy {
        namespace: String,
        target: TargetService,
    },
    Restart {
        namespace: String,
        target: TargetService,
    },
    StreamLogs {
        namespace: String,
        target: TargetService,
    },
    Pull,
}

impl RuntimeCall {
    /// Namespace the call addressed; `None` for `Pull`.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        match self {
            RuntimeCall::Start { namespace, .. }
            | RuntimeCall::Stop { namespace, .. }
            | RuntimeCall::Destroy { namespace, .. }
            | RuntimeCall::Restart { namespace, .. }
            | RuntimeCall::StreamLogs { namespace, .. } => Some(namespace),
            RuntimeCall::Pull => None,
        }
    }
}

/// Lifecycle state of a simulated group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Running,
    Stopped,
}

#[derive(Default)]
struct State {
    calls: Vec<RuntimeCall>,
    groups: HashMap<String, GroupState>,
    failures: HashMap<String, RuntimeError>,
    log_lines: Vec<String>,
    finite_logs: bool,
    delay: Option<Duration>,
}

/// Records every call and simulates per-namespace group state.
///
/// Groups follow compose semantics: `start` on a running group fails with
/// `AlreadyRunning`, `stop` needs a running group, and `restart`,
/// `destroy` and `stream_logs` need the group to exist.
#[derive(Clone, Default)]
pub struct RecordingRuntime {
    state: Arc<Mutex<State>>,
}

impl RecordingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("lock runtime state")
    }

    #[must_use]
    pub fn with_group(self, namespace: &str, state: GroupState) -> Self {
        self.lock().groups.insert(namespace.to_string(), state);
        self
    }

    /// Every call addressed to `namespace` fails with `err`.
    #[must_use]
    pub fn failing(self, namespace: &str, err: RuntimeError) -> Self {
        self.lock().failures.insert(namespace.to_string(), err);
        self
    }

    /// Lines yielded by `stream_logs`. The stream stays open afterwards
    /// unless [`Self::with_finite_logs`] is set.
    #[must_use]
    pub fn with_log_lines<I, L>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.lock().log_lines = lines.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_finite_logs(self) -> Self {
        self.lock().finite_logs = true;
        self
    }

    /// Delay every call by `delay` before answering.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        self.lock().delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.lock().calls.clone()
    }

    pub fn calls_for(&self, namespace: &str) -> Vec<RuntimeCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.namespace() == Some(namespace))
            .cloned()
            .collect()
    }

    pub fn group(&self, namespace: &str) -> Option<GroupState> {
        self.lock().groups.get(namespace).copied()
    }

    async fn enter(&self, call: RuntimeCall) -> Result<(), RuntimeError> {
        let delay = {
            let mut state = self.lock();
            let failure = call
                .namespace()
                .and_then(|ns| state.failures.get(ns).cloned());
            state.calls.push(call);
            if let Some(err) = failure {
                return Err(err);
            }
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

#[async_trait]
impl RuntimeAdapter for RecordingRuntime {
    async fn start(
        &self,
        namespace: &Namespace,
        config: &InstanceConfig,
        target: TargetService,
    ) -> Result<(), RuntimeError> {
        self.enter(RuntimeCall::Start {
            namespace: namespace.to_string(),
            target,
            config: config.clone(),
        })
        .await?;

        let mut state = self.lock();
        if state.groups.get(namespace.as_str()) == Some(&GroupState::Running) {
            return Err(RuntimeError::AlreadyRunning(namespace.to_string()));
        }
        state
            .groups
            .insert(namespace.to_string(), GroupState::Running);
        Ok(())
    }

    async fn stop(&self, namespace: &Namespace, target: TargetService) -> Result<(), RuntimeError> {
        self.enter(RuntimeCall::Stop {
            namespace: namespace.to_string(),
            target,
        })
        .await?;

        let mut state = self.lock();
        match state.groups.get_mut(namespace.as_str()) {
            Some(group) if *group == GroupState::Running => {
                *group = GroupState::Stopped;
                Ok(())
            }
            _ => Err(RuntimeError::NotFound(namespace.to_string())),
        }
    }

    async fn destroy(
        &self,
        namespace: &Namespace,
        target: TargetService,
    ) -> Result<(), RuntimeError> {
        self.enter(RuntimeCall::Destroy {
            namespace: namespace.to_string(),
            target,
        })
        .await?;

        match self.lock().groups.remove(namespace.as_str()) {
            Some(_) => Ok(()),
            None => Err(RuntimeError::NotFound(namespace.to_string())),
        }
    }

    async fn restart(
        &self,
        namespace: &Namespace,
        target: TargetService,
    ) -> Result<(), RuntimeError> {
        self.enter(RuntimeCall::Restart {
            namespace: namespace.to_string(),
            target,
        })
        .await?;

        match self.lock().groups.get_mut(namespace.as_str()) {
            Some(group) => {
                *group = GroupState::Running;
                Ok(())
            }
            None => Err(RuntimeError::NotFound(namespace.to_string())),
        }
    }

    async fn stream_logs(
        &self,
        namespace: &Namespace,
        target: TargetService,
    ) -> Result<LogStream, RuntimeError> {
        self.enter(RuntimeCall::StreamLogs {
            namespace: namespace.to_string(),
            target,
        })
        .await?;

        let state = self.lock();
        if !state.groups.contains_key(namespace.as_str()) {
            return Err(RuntimeError::NotFound(namespace.to_string()));
        }
        let lines = stream::iter(state.log_lines.clone().into_iter().map(Ok));
        if state.finite_logs {
            Ok(lines.boxed())
        } else {
            Ok(lines.chain(stream::pending()).boxed())
        }
    }

    async fn pull(&self) -> Result<(), RuntimeError> {
        self.enter(RuntimeCall::Pull).await
    }
}
