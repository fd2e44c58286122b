//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy
//! tasks. Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use telergo_core::link::Payload;

use crate::command::SwitchCommand;
use crate::session::{NetReply, NetRequest};

/// Channel capacity for inbound broker payloads
const INBOUND_CHANNEL_SIZE: usize = 4;

/// Switch commands decoded from broker messages
pub static SWITCH_CMD: Signal<CriticalSectionRawMutex, SwitchCommand> = Signal::new();

/// Logical switch state after each completed transition (and on query)
pub static SWITCH_STATE: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Raw payloads received from the broker
pub static INBOUND: Channel<CriticalSectionRawMutex, Payload, INBOUND_CHANNEL_SIZE> =
    Channel::new();

/// Session requests to the transport worker
pub static NET_REQUEST: Channel<CriticalSectionRawMutex, NetRequest, 1> = Channel::new();

/// Worker replies; strictly one per request
pub static NET_REPLY: Channel<CriticalSectionRawMutex, NetReply, 1> = Channel::new();
