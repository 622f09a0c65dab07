//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                 ┌───────────────────────────┐
//!                 │        Application        │
//!     ┌───────────┤  ConfigStore, Dispatcher  ├───────────┐
//!     │           └───────────────────────────┘           │
//!     ▼                                                   ▼
//! ┌──────────────┐                               ┌────────────────┐
//! │ KeyValue     │                               │ Runtime        │
//! │ Source       │                               │ Adapter        │
//! └──────────────┘                               └────────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`KeyValueSource`] - flat key/value configuration lookup
//! - [`RuntimeAdapter`] - lifecycle control of an isolated instance group

mod runtime;
mod source;

pub use runtime::{LogStream, RuntimeAdapter};
pub use source::KeyValueSource;
