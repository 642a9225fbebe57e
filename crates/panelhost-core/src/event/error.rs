//! # Panelhost Event System Errors
//!
//! The bus itself never fails: `emit` always completes its broadcast pass and
//! handler panics are contained. The only error is parsing an unknown event
//! type name.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("Unknown plugin event type '{0}'")]
    UnknownEventType(String),
}
