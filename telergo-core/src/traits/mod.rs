//! Capability traits
//!
//! These traits define the interface between the control core and the
//! platform-specific implementations. The state machines never talk to
//! hardware or to a transport directly; they drive capabilities injected
//! at construction, which keeps them deterministic under test.

pub mod relay;
pub mod session;
pub mod system;

pub use relay::{RelayActuator, RelayChannel};
pub use session::Session;
pub use system::RestartControl;
