//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement fleet commands.

pub mod config_store;
pub mod dispatcher;
pub mod report;

pub use config_store::ConfigStore;
pub use dispatcher::{
    CommandDispatcher, DispatchObserver, InterruptHandle, Interrupts, Plan, SilentObserver,
};
pub use report::{aggregate, DiagnosticLine, Report, Status};
