//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`runtime`] — `RecordingRuntime`, an in-memory [`RuntimeAdapter`](crate::port::RuntimeAdapter)
//!   that records calls and tracks group state per namespace.
//! - [`env`] — Builders for key/value sources with complete device entries.

pub mod env;
pub mod runtime;

use std::time::Duration;

use crate::application::{CommandDispatcher, ConfigStore};
use crate::domain::DEFAULT_PREFIX;
use crate::infrastructure::config::service::KeyScheme;
use crate::port::{KeyValueSource, RuntimeAdapter};

/// Dispatcher with the default key scheme and prefix and a short timeout.
pub fn dispatcher<S, R>(source: S, runtime: R) -> CommandDispatcher<S, R>
where
    S: KeyValueSource,
    R: RuntimeAdapter,
{
    CommandDispatcher::new(
        ConfigStore::new(source, KeyScheme::default()),
        runtime,
        DEFAULT_PREFIX,
        Duration::from_secs(5),
    )
}
