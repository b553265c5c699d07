//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod actuator;
pub mod network;
pub mod time_source;

pub use actuator::Actuator;
pub use network::NetworkProvisioner;
pub use time_source::TimeSource;
