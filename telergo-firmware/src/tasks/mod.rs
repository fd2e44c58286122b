//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod heartbeat;
pub mod link;
pub mod net;
pub mod switch;

pub use heartbeat::heartbeat_task;
pub use link::link_task;
pub use net::{cyw43_task, net_task, transport_task};
pub use switch::switch_task;
