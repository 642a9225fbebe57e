//! # Panelhost Kernel
//!
//! Wires the runtime together. [`DashboardHost`](bootstrap::DashboardHost)
//! owns the registry, the user-state store and the host configuration,
//! opens per-token sessions and mounts plugin panels into a
//! [`Dashboard`](bootstrap::Dashboard).
//!
//! System-wide constants live in [`constants`]; the aggregate
//! [`Error`](error::Error) and its `Result` alias live in [`error`].
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::{Dashboard, DashboardHost};
pub use error::{Error, Result};

// Test module declaration
#[cfg(test)]
mod tests;
