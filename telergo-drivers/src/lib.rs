//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the capability traits
//! defined in telergo-core:
//!
//! - Relay pair actuator (two GPIO outputs)
//! - Heartbeat LED indicator

#![no_std]
#![deny(unsafe_code)]

pub mod indicator;
pub mod pin;
pub mod relay;
