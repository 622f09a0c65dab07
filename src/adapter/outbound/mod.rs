//! Outbound adapters: container runtime, key/value sources, host setup.

pub mod compose;
pub mod env;
pub mod setup;

pub use compose::ComposeRuntime;
pub use env::{EnvFileSource, LayeredSource, ProcessEnvSource};
pub use setup::SetupRunner;
