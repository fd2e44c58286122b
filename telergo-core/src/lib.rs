//! Board-agnostic control core for the Telergo remote switch
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Capability traits (relay actuation, broker session, restart)
//! - Relay interlock sequencer
//! - Broker link state machine
//! - Wraparound-safe millisecond clock arithmetic
//! - Configuration type definitions
//!
//! Both state machines are cooperative: they expose a `run()` operation
//! that must be polled frequently by the platform's driver loop and do at
//! most one transition's worth of work per call.

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod link;
pub mod relay;
pub mod traits;
