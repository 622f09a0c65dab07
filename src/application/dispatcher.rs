//! Command dispatch across device indices.
//!
//! The dispatcher validates a request up front, then walks the index list in
//! the order given. Each index is resolved, namespaced, and handed to the
//! runtime independently: a failure on one index is recorded and the batch
//! moves on.

use std::future::Future;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config_store::ConfigStore;
use crate::domain::{
    Action, ActionRequest, ActionResult, DeviceIndex, InstanceConfig, Namespace, Outcome,
    TargetService,
};
use crate::error::{ConfigError, DispatchError, RuntimeError};
use crate::port::{KeyValueSource, RuntimeAdapter};

/// A request that passed pre-flight validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub action: Action,
    pub target: TargetService,
    pub indices: Vec<DeviceIndex>,
}

impl Plan {
    /// Validate a raw request. No runtime call happens here.
    pub fn from_request(request: &ActionRequest) -> Result<Self, DispatchError> {
        let action: Action = request.action.parse()?;
        let target = TargetService::parse(request.service.as_deref())?;
        if request.indices.is_empty() {
            return Err(DispatchError::NoIndices);
        }
        Ok(Self {
            action,
            target,
            indices: request.indices.clone(),
        })
    }
}

/// Receives progress callbacks and log lines during dispatch.
pub trait DispatchObserver: Send {
    /// An index is about to be processed.
    fn started(&mut self, _index: &DeviceIndex, _action: Action) {}

    /// An index finished.
    fn finished(&mut self, _result: &ActionResult) {}

    /// A log line arrived while tailing `index`.
    fn log_line(&mut self, index: &DeviceIndex, line: &str);
}

/// Observer that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl DispatchObserver for SilentObserver {
    fn log_line(&mut self, _index: &DeviceIndex, _line: &str) {}
}

/// Operator interrupt signals consumed by log tailing.
///
/// Each received signal ends the stream currently being tailed.
#[derive(Debug)]
pub struct Interrupts {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Sending half of [`Interrupts`].
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl InterruptHandle {
    /// Signal one interrupt. Returns false once the receiver is gone.
    pub fn interrupt(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

impl Interrupts {
    pub fn channel() -> (InterruptHandle, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (InterruptHandle { tx }, Self { rx })
    }

    /// Interrupts that never fire.
    pub fn none() -> Self {
        let (_handle, interrupts) = Self::channel();
        interrupts
    }

    async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

/// Applies lifecycle actions to device instances.
pub struct CommandDispatcher<S, R> {
    store: ConfigStore<S>,
    runtime: R,
    prefix: String,
    action_timeout: Duration,
}

impl<S, R> CommandDispatcher<S, R>
where
    S: KeyValueSource,
    R: RuntimeAdapter,
{
    pub fn new(
        store: ConfigStore<S>,
        runtime: R,
        prefix: impl Into<String>,
        action_timeout: Duration,
    ) -> Self {
        Self {
            store,
            runtime,
            prefix: prefix.into(),
            action_timeout,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn store(&self) -> &ConfigStore<S> {
        &self.store
    }

    /// Namespace for `index` under the configured prefix.
    #[must_use]
    pub fn namespace(&self, index: &DeviceIndex) -> Namespace {
        Namespace::derive(&self.prefix, index)
    }

    /// Resolve configuration for each index without touching the runtime.
    pub fn check(
        &self,
        indices: &[DeviceIndex],
    ) -> Vec<(DeviceIndex, Result<(Namespace, InstanceConfig), ConfigError>)> {
        indices
            .iter()
            .map(|index| {
                let resolved = self
                    .store
                    .resolve(index)
                    .map(|config| (self.namespace(index), config));
                (index.clone(), resolved)
            })
            .collect()
    }

    /// Validate `request` and run it against every index in order.
    ///
    /// Returns exactly one result per supplied index, duplicates included.
    /// Pre-flight failures abort before any runtime call.
    pub async fn dispatch(
        &self,
        request: &ActionRequest,
        observer: &mut dyn DispatchObserver,
        interrupts: &mut Interrupts,
    ) -> Result<Vec<ActionResult>, DispatchError> {
        let plan = Plan::from_request(request)?;
        info!(
            action = %plan.action,
            target = %plan.target,
            count = plan.indices.len(),
            "dispatching"
        );

        let mut results = Vec::with_capacity(plan.indices.len());
        for index in &plan.indices {
            observer.started(index, plan.action);
            let result = self
                .run_one(index, plan.action, plan.target, observer, interrupts)
                .await;
            match &result.outcome {
                Outcome::Success => {
                    info!(index = %index, action = %plan.action, "instance action succeeded");
                }
                Outcome::Failure(err) => {
                    warn!(index = %index, action = %plan.action, error = %err, "instance action failed");
                }
            }
            observer.finished(&result);
            results.push(result);
        }
        Ok(results)
    }

    async fn run_one(
        &self,
        index: &DeviceIndex,
        action: Action,
        target: TargetService,
        observer: &mut dyn DispatchObserver,
        interrupts: &mut Interrupts,
    ) -> ActionResult {
        let config = match self.store.resolve(index) {
            Ok(config) => config,
            Err(err) => return ActionResult::failure(index.clone(), None, err),
        };

        let namespace = self.namespace(index);
        debug!(index = %index, namespace = %namespace, "resolved instance");

        let outcome = match action {
            Action::Up => {
                self.bounded(self.runtime.start(&namespace, &config, target))
                    .await
            }
            Action::Stop => self.bounded(self.runtime.stop(&namespace, target)).await,
            Action::Down => self.bounded(self.runtime.destroy(&namespace, target)).await,
            Action::Restart => self.bounded(self.runtime.restart(&namespace, target)).await,
            Action::Logs => {
                self.tail(index, &namespace, target, observer, interrupts)
                    .await
            }
        };

        match outcome {
            Ok(()) => ActionResult::success(index.clone(), namespace),
            Err(err) => ActionResult::failure(index.clone(), Some(namespace), err),
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, RuntimeError>>,
    ) -> Result<T, RuntimeError> {
        tokio::time::timeout(self.action_timeout, call)
            .await
            .unwrap_or(Err(RuntimeError::Timeout(self.action_timeout)))
    }

    /// Follow one namespace's logs until interrupted or the stream ends.
    async fn tail(
        &self,
        index: &DeviceIndex,
        namespace: &Namespace,
        target: TargetService,
        observer: &mut dyn DispatchObserver,
        interrupts: &mut Interrupts,
    ) -> Result<(), RuntimeError> {
        let mut stream = self
            .bounded(self.runtime.stream_logs(namespace, target))
            .await?;
        info!(namespace = %namespace, target = %target, "tailing logs");

        loop {
            tokio::select! {
                biased;
                Some(()) = interrupts.recv() => {
                    info!(namespace = %namespace, "log tail interrupted");
                    return Ok(());
                }
                item = stream.next() => match item {
                    Some(Ok(line)) => observer.log_line(index, &line),
                    Some(Err(err)) => return Err(err),
                    None => {
                        debug!(namespace = %namespace, "log stream ended");
                        return Ok(());
                    }
                },
            }
        }
    }
}
