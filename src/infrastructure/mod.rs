//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! orchestration logic.
//!
//! # Submodules
//!
//! - [`config`] - Settings loading, validation, and logging setup
//! - [`bootstrap`] - Composition root wiring settings to adapters

pub mod bootstrap;
pub mod config;
