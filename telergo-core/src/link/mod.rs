//! Broker link lifecycle
//!
//! Connection management for the publish/subscribe session: connect,
//! fixed-interval bounded retry, fail-safe restart on exhaustion,
//! subscribe-on-connect, and a single-slot outbound publish queue.

pub mod events;
pub mod machine;

pub use events::{DiagSink, LinkEvent};
pub use machine::{BrokerLink, Payload, MAX_PAYLOAD_LEN};
