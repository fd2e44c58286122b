//! Relay interlock sequencing

pub mod interlock;

pub use interlock::{RelayInterlock, DEFAULT_DWELL_MS};
