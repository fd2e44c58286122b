//! Status indicator drivers

pub mod heartbeat;

pub use heartbeat::Heartbeat;
