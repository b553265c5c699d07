//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ServoSwitchError`] via `#[from]` or an explicit `From` impl.

/// Boxed error coming from an adapter (hardware, network, time source).
pub type AdapterError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for every operation that crosses a port boundary.
#[derive(Debug, thiserror::Error)]
pub enum ServoSwitchError {
    /// A command argument failed validation.
    #[error("Validation error")]
    Validation(#[from] ValidationError),

    /// The actuator could not be driven.
    #[error("Actuator error")]
    Hardware(#[source] AdapterError),

    /// The network provisioner failed.
    #[error("Network error")]
    Network(#[source] AdapterError),

    /// The external time source could not be reached or answered garbage.
    #[error("Time source error")]
    TimeSource(#[source] AdapterError),
}

/// Rejected command input.
///
/// The display strings are the exact plain-text reasons sent back to HTTP
/// clients with a `400` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Value outside `[0, 180]` or not an integer.
    #[error("Invalid angle. Must be between 0 and 180.")]
    InvalidAngle,

    /// A required query argument is absent.
    #[error("Missing {0} parameter.")]
    MissingParameter(&'static str),
}
