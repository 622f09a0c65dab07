//! Gpufleet - isolated GPU service pairs, one per device.
//!
//! Each device index runs a compute backend and a companion worker inside
//! its own runtime namespace. Per-device settings come from a flat
//! key/value source (`CUDA_DEVICE_<i>`, `COMFYUI_PORT_<i>`,
//! `ERC20_ADDRESS_<i>`), and every action reports one result per index.
//!
//! # Architecture
//!
//! - **`domain`** - Indices, namespaces, actions, per-index outcomes
//! - **`port`** - `KeyValueSource` and `RuntimeAdapter` traits
//! - **`application`** - `ConfigStore`, `CommandDispatcher`, result aggregation
//! - **`adapter`** - Docker Compose runtime, env-file sources, the CLI
//! - **`infrastructure`** - Settings, logging, and the composition root
//!
//! # Example
//!
//! ```no_run
//! use gpufleet::application::{CommandDispatcher, ConfigStore, Interrupts, SilentObserver};
//! use gpufleet::adapter::outbound::{ComposeRuntime, ProcessEnvSource};
//! use gpufleet::domain::{ActionRequest, DeviceIndex};
//! use gpufleet::infrastructure::config::settings::Settings;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::default();
//! let dispatcher = CommandDispatcher::new(
//!     ConfigStore::new(ProcessEnvSource, settings.keys.clone()),
//!     ComposeRuntime::new(&settings.compose_file, settings.services.clone()),
//!     settings.project_prefix.clone(),
//!     settings.action_timeout(),
//! );
//!
//! let request = ActionRequest::new("up", DeviceIndex::parse_list("0,1"));
//! let results = dispatcher
//!     .dispatch(&request, &mut SilentObserver, &mut Interrupts::none())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
