//! Runtime-agnostic fleet domain types.

mod action;
mod index;
mod instance;
mod namespace;
mod outcome;

pub use action::{Action, ActionRequest, ServiceRole, TargetService};
pub use index::DeviceIndex;
pub use instance::InstanceConfig;
pub use namespace::{is_valid_prefix, Namespace, DEFAULT_PREFIX};
pub use outcome::{ActionResult, Outcome};
