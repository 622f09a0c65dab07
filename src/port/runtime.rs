//! Container runtime port.
//!
//! The orchestrator never talks to the container engine directly. Every
//! lifecycle operation goes through [`RuntimeAdapter`], scoped by a
//! [`Namespace`] so operations on one instance cannot touch another.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::domain::{InstanceConfig, Namespace, TargetService};
use crate::error::RuntimeError;

/// Lazy, possibly infinite sequence of log lines.
///
/// The stream is not restartable. Dropping it cancels the underlying tail.
pub type LogStream = BoxStream<'static, Result<String, RuntimeError>>;

/// Lifecycle control over isolated compute/worker groups.
///
/// Implementations perform no retries; each failure is returned as-is.
#[async_trait]
pub trait RuntimeAdapter: Send + Sync {
    /// Create and start the group, passing `config` as environment bindings
    /// scoped to the group.
    async fn start(
        &self,
        namespace: &Namespace,
        config: &InstanceConfig,
        target: TargetService,
    ) -> Result<(), RuntimeError>;

    /// Stop running services without removing them.
    async fn stop(&self, namespace: &Namespace, target: TargetService) -> Result<(), RuntimeError>;

    /// Stop and remove services.
    async fn destroy(
        &self,
        namespace: &Namespace,
        target: TargetService,
    ) -> Result<(), RuntimeError>;

    /// Restart existing services.
    async fn restart(
        &self,
        namespace: &Namespace,
        target: TargetService,
    ) -> Result<(), RuntimeError>;

    /// Follow service logs. `Both` interleaves the two roles.
    async fn stream_logs(
        &self,
        namespace: &Namespace,
        target: TargetService,
    ) -> Result<LogStream, RuntimeError>;

    /// Fetch the images used by both roles.
    async fn pull(&self) -> Result<(), RuntimeError>;
}
